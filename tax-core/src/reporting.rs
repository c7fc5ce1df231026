//! The event sink consumed by presentation layers.
//!
//! The engine hands every [`LineItem`] to a [`Reporter`] in pipeline order.
//! Renderers turn them into text or HTML; [`NoopReporter`] drops them for
//! evaluations whose breakdown nobody reads.

use crate::models::LineItem;

/// Receives report lines in emission order.
pub trait Reporter {
    fn report(
        &mut self,
        item: LineItem,
    );
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(
        &mut self,
        _item: LineItem,
    ) {
    }
}

/// Collects lines for later inspection.
impl Reporter for Vec<LineItem> {
    fn report(
        &mut self,
        item: LineItem,
    ) {
        self.push(item);
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(
        &mut self,
        item: LineItem,
    ) {
        (**self).report(item);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn vec_collects_in_order() {
        let mut lines: Vec<LineItem> = Vec::new();

        lines.report(LineItem::section_start("A"));
        lines.report(LineItem::detail("b"));

        assert_eq!(
            lines,
            vec![LineItem::section_start("A"), LineItem::detail("b")]
        );
    }

    #[test]
    fn noop_accepts_anything() {
        let mut reporter = NoopReporter;

        reporter.report(LineItem::text("ignored"));
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut lines: Vec<LineItem> = Vec::new();
        {
            let mut forward = &mut lines;
            forward.report(LineItem::text("through a reference"));
        }

        assert_eq!(lines.len(), 1);
    }
}
