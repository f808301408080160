// SPDX-License-Identifier: GPL-3.0-or-later

//! Disambiguation: reduce a candidate list to the one track to write.

use crate::operator::{Choice, DecisionProvider};
use tracing::debug;
use tunetag_domain::TrackCandidate;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Chosen(TrackCandidate),
    /// The operator quit; the file is skipped without writing.
    Abandoned,
}

/// Ask `provider` until it names a listed ordinal or quits.
///
/// Anything else (non-numeric input, `0`, an ordinal past the end) is
/// handed back to the provider as rejected and asked again, without limit.
pub async fn select<P: DecisionProvider + ?Sized>(
    mut candidates: Vec<TrackCandidate>,
    provider: &mut P,
) -> Selection {
    if candidates.is_empty() {
        return Selection::Abandoned;
    }

    let mut rejected: Option<Choice> = None;
    loop {
        let choice = provider.choose(&candidates, rejected.as_ref()).await;
        match choice {
            Choice::Quit => {
                debug!(target: "selector", "selection abandoned");
                return Selection::Abandoned;
            }
            Choice::Ordinal(ordinal) => {
                if let Some(index) = candidates.iter().position(|c| c.ordinal == ordinal) {
                    debug!(target: "selector", ordinal, "candidate selected");
                    return Selection::Chosen(candidates.swap_remove(index));
                }
                debug!(target: "selector", ordinal, "ordinal not listed");
                rejected = Some(choice);
            }
            Choice::Unparsed(ref input) => {
                debug!(target: "selector", input = %input, "input is not an ordinal");
                rejected = Some(choice);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ScriptedOperator;

    fn listing(count: u32) -> Vec<TrackCandidate> {
        (1..=count)
            .map(|ordinal| TrackCandidate {
                ordinal,
                track_title: format!("Track {}", ordinal),
                album_title: "Album".to_string(),
                album_type: "album".to_string(),
                artist_names: vec!["Artist".to_string()],
                copyright: Vec::new(),
                publishing: Vec::new(),
                cover_url: None,
                disc_number: 1,
                track_number: ordinal,
                duration_ms: 0,
                release_date: None,
                genres: Vec::new(),
                url: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn picks_the_named_ordinal() {
        let mut operator = ScriptedOperator::new().pick(2);

        let selection = select(listing(3), &mut operator).await;

        match selection {
            Selection::Chosen(candidate) => {
                assert_eq!(candidate.ordinal, 2);
                assert_eq!(candidate.track_title, "Track 2");
            }
            Selection::Abandoned => panic!("expected a candidate"),
        }
        assert!(operator.rejected.is_empty());
    }

    #[tokio::test]
    async fn rejects_zero_past_end_and_garbage_then_accepts() {
        let mut operator = ScriptedOperator::new()
            .pick(0)
            .pick(4)
            .answer(Choice::Unparsed("two".to_string()))
            .pick(3);

        let selection = select(listing(3), &mut operator).await;

        assert!(matches!(selection, Selection::Chosen(ref c) if c.ordinal == 3));
        assert_eq!(
            operator.rejected,
            vec![
                Choice::Ordinal(0),
                Choice::Ordinal(4),
                Choice::Unparsed("two".to_string())
            ]
        );
        assert_eq!(operator.listings_seen, 1);
    }

    #[tokio::test]
    async fn quit_abandons() {
        let mut operator = ScriptedOperator::new().pick(9).answer(Choice::Quit);

        let selection = select(listing(2), &mut operator).await;

        assert_eq!(selection, Selection::Abandoned);
        assert_eq!(operator.rejected, vec![Choice::Ordinal(9)]);
    }

    #[tokio::test]
    async fn empty_listing_is_abandoned_without_asking() {
        let mut operator = ScriptedOperator::new().pick(1);

        assert_eq!(select(Vec::new(), &mut operator).await, Selection::Abandoned);
        assert_eq!(operator.listings_seen, 0);
    }
}
