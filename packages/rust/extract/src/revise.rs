//! Context-sensitive revision: turn context-free labels into a final
//! content/boilerplate decision using neighbouring paragraphs.
//!
//! SHORT paragraphs are resolved first, left to right, so a SHORT paragraph
//! sees the already resolved labels of earlier SHORT ones. NEARGOOD
//! paragraphs are resolved afterwards, also left to right. The document
//! boundary counts as a BAD neighbour.

use crate::paragraph::{FinalLabel, Label, Paragraph};

/// Resolve every paragraph's `final_label`.
pub fn revise_paragraphs(paragraphs: &mut [Paragraph], max_heading_distance: usize) {
    let mut labels: Vec<Label> = paragraphs
        .iter()
        .map(|p| p.context_free_label.unwrap_or(Label::Bad))
        .collect();

    for i in 0..labels.len() {
        if labels[i] != Label::Short {
            continue;
        }
        let prev = prev_resolved(&labels, i);
        let next = next_resolved(&labels, i);

        labels[i] = match (verdict(prev), verdict(next)) {
            (FinalLabel::Good, FinalLabel::Good) => Label::Good,
            (FinalLabel::Bad, FinalLabel::Bad) => Label::Bad,
            _ => {
                let good_distance = [prev, next]
                    .into_iter()
                    .flatten()
                    .find(|(_, label)| *label == FinalLabel::Good)
                    .map(|(j, _)| i.abs_diff(j));

                match good_distance {
                    Some(distance)
                        if paragraphs[i].is_heading && distance <= max_heading_distance =>
                    {
                        Label::Good
                    }
                    _ => Label::Bad,
                }
            }
        };
    }

    for i in 0..labels.len() {
        if labels[i] != Label::NearGood {
            continue;
        }
        let prev = verdict(prev_resolved(&labels, i));
        let next = verdict(next_resolved(&labels, i));

        labels[i] = if prev == FinalLabel::Bad && next == FinalLabel::Bad {
            Label::Bad
        } else {
            Label::Good
        };
    }

    for (paragraph, label) in paragraphs.iter_mut().zip(labels) {
        paragraph.final_label = Some(match label {
            Label::Good => FinalLabel::Good,
            _ => FinalLabel::Bad,
        });
    }
}

/// Neighbour label, with the document boundary counting as BAD.
fn verdict(neighbour: Option<(usize, FinalLabel)>) -> FinalLabel {
    neighbour.map_or(FinalLabel::Bad, |(_, label)| label)
}

fn resolved(label: Label) -> Option<FinalLabel> {
    match label {
        Label::Good => Some(FinalLabel::Good),
        Label::Bad => Some(FinalLabel::Bad),
        Label::Short | Label::NearGood => None,
    }
}

/// Nearest earlier paragraph that is already GOOD or BAD.
fn prev_resolved(labels: &[Label], i: usize) -> Option<(usize, FinalLabel)> {
    (0..i)
        .rev()
        .find_map(|j| resolved(labels[j]).map(|label| (j, label)))
}

/// Nearest later paragraph that is already GOOD or BAD.
fn next_resolved(labels: &[Label], i: usize) -> Option<(usize, FinalLabel)> {
    (i + 1..labels.len()).find_map(|j| resolved(labels[j]).map(|label| (j, label)))
}
