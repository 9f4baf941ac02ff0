//! Links annotations to the annotations they reply to.

use std::collections::HashMap;

use crate::diagnostics::DiagnosticSink;
use crate::model::{Annotation, ObjectId, PageRef};

/// How a child relates to its parent, from the `/RT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// An ordinary reply (`/RT /R` or no `/RT`)
    Reply,
    /// Grouped with the parent (`/RT /Group`)
    Group,
}

impl ReplyKind {
    /// Classify a raw `/RT` value. `None` means the value is not one of
    /// the two defined names.
    pub fn from_marker(marker: Option<&str>) -> Option<Self> {
        match marker {
            None | Some("R") => Some(Self::Reply),
            Some("Group") => Some(Self::Group),
            Some(_) => None,
        }
    }
}

/// Map from object id to position in `annotations`.
pub fn object_index(annotations: &[Annotation]) -> HashMap<ObjectId, usize> {
    annotations
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.object_id.map(|id| (id, i)))
        .collect()
}

/// Resolve `/IRT` references within one page.
///
/// A reference to an annotation that isn't on the page, or to the
/// annotation itself, is reported once and cleared. Never fails.
/// Returns the number of links recorded.
pub fn resolve_replies(
    annotations: &mut [Annotation],
    ids: &HashMap<ObjectId, usize>,
    page: &PageRef,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut links = Vec::new();

    for (i, annot) in annotations.iter_mut().enumerate() {
        let Some(parent_id) = annot.in_reply_to else {
            continue;
        };

        let parent = match ids.get(&parent_id) {
            Some(&p) if p != i => p,
            _ => {
                sink.warn(
                    Some(page),
                    &format!(
                        "{} annotation{} replies to object {} {} which is not on this page",
                        annot.kind,
                        describe(annot),
                        parent_id.0,
                        parent_id.1
                    ),
                );
                annot.in_reply_to = None;
                continue;
            }
        };

        let kind = ReplyKind::from_marker(annot.reply_marker.as_deref()).unwrap_or_else(|| {
            sink.warn(
                Some(page),
                &format!(
                    "Unexpected /RT value {:?} on {} annotation{}, treating as a reply",
                    annot.reply_marker.as_deref().unwrap_or_default(),
                    annot.kind,
                    describe(annot)
                ),
            );
            ReplyKind::Reply
        });

        annot.is_group_child = kind == ReplyKind::Group;
        if let Some(child_id) = annot.object_id {
            links.push((parent, child_id, kind));
        }
    }

    for &(parent, child_id, kind) in &links {
        let parent = &mut annotations[parent];
        match kind {
            ReplyKind::Reply => parent.replies.push(child_id),
            ReplyKind::Group => parent.group_children.push(child_id),
        }
    }

    links.len()
}

fn describe(annot: &Annotation) -> String {
    match annot.object_id {
        Some((num, gen)) => format!(" {} {}", num, gen),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::model::AnnotationType;

    fn page() -> PageRef {
        PageRef {
            index: 0,
            label: None,
        }
    }

    fn resolve(annots: &mut [Annotation], sink: &mut MemorySink) -> usize {
        let ids = object_index(annots);
        resolve_replies(annots, &ids, &page(), sink)
    }

    #[test]
    fn test_reply_and_group() {
        let mut annots = vec![
            Annotation::new(0, AnnotationType::Highlight).with_object_id((10, 0)),
            Annotation::new(0, AnnotationType::Text)
                .with_object_id((11, 0))
                .with_reply_to((10, 0), None),
            Annotation::new(0, AnnotationType::Text)
                .with_object_id((12, 0))
                .with_reply_to((10, 0), Some("Group")),
        ];
        let mut sink = MemorySink::new();

        assert_eq!(resolve(&mut annots, &mut sink), 2);
        assert_eq!(annots[0].replies, vec![(11, 0)]);
        assert_eq!(annots[0].group_children, vec![(12, 0)]);
        assert!(!annots[1].is_group_child);
        assert!(annots[2].is_group_child);
        assert_eq!(sink.entries.len(), 0);
    }

    #[test]
    fn test_dangling_reply_becomes_root_once() {
        let mut annots = vec![Annotation::new(0, AnnotationType::Text)
            .with_object_id((11, 0))
            .with_reply_to((99, 0), Some("R"))];
        let mut sink = MemorySink::new();

        assert_eq!(resolve(&mut annots, &mut sink), 0);
        assert!(!annots[0].is_reply());
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.entries[0].message.contains("object 99 0"));

        // Running again finds nothing more to report
        resolve(&mut annots, &mut sink);
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_self_reply_is_dangling() {
        let mut annots = vec![Annotation::new(0, AnnotationType::Text)
            .with_object_id((11, 0))
            .with_reply_to((11, 0), None)];
        let mut sink = MemorySink::new();

        resolve(&mut annots, &mut sink);
        assert!(!annots[0].is_reply());
        assert!(annots[0].replies.is_empty());
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_unknown_reply_marker() {
        let mut annots = vec![
            Annotation::new(0, AnnotationType::Highlight).with_object_id((10, 0)),
            Annotation::new(0, AnnotationType::Text)
                .with_object_id((11, 0))
                .with_reply_to((10, 0), Some("Thread")),
        ];
        let mut sink = MemorySink::new();

        resolve(&mut annots, &mut sink);
        assert_eq!(annots[0].replies, vec![(11, 0)]);
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.entries[0].message.contains("Thread"));
    }
}
