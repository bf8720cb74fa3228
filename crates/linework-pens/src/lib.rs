//! Pen definitions and layer assignment.
//!
//! A [`PenTable`] maps pen identifiers to physical pens (stroke color and
//! tip width). The table is an explicit value handed to [`assign_pens`],
//! so different callers can carry different pen sets; there is no
//! process-wide registry.

mod table;

pub use table::{Pen, PenTable};

use linework_core::errors::PenError;
use linework_core::Document;

/// Assign pens to a document's layers.
///
/// Layers pair with `pen_ids` positionally: the first layer gets the
/// first id, and so on. Each matched layer takes the pen's color and
/// width and is named after the pen id. Ids without a table entry fall
/// back to [`Pen::fallback`]. Extra ids are ignored; layers beyond the
/// id list are left untouched.
pub fn assign_pens(
    document: &mut Document,
    table: &PenTable,
    pen_ids: &[impl AsRef<str>],
) -> Result<(), PenError> {
    if table.is_empty() {
        return Err(PenError::EmptyTable);
    }

    for ((_, layer), pen_id) in document.layers_mut().zip(pen_ids) {
        let pen_id = pen_id.as_ref();
        let pen = table.get(pen_id).copied().unwrap_or_else(Pen::fallback);
        layer.name = Some(pen_id.to_string());
        layer.color = Some(pen.color);
        layer.pen_width = Some(pen.width);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use linework_core::{Color, Path};

    fn doc_with_layers(n: u32) -> Document {
        let mut doc = Document::new();
        for id in 1..=n {
            doc.push_path(
                id,
                Path::new(vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)]),
            );
        }
        doc
    }

    #[test]
    fn assigns_in_layer_order() {
        let mut doc = doc_with_layers(2);
        let table = PenTable::builtin();

        assign_pens(&mut doc, &table, &["felt_tip_Red", "technical_pen_Gray"]).unwrap();

        let first = doc.layer(1).unwrap();
        assert_eq!(first.name.as_deref(), Some("felt_tip_Red"));
        assert_eq!(first.color, Some(Color::rgb(0xC0, 0x39, 0x2B)));
        assert_eq!(first.pen_width, Some(0.7));

        let second = doc.layer(2).unwrap();
        assert_eq!(second.name.as_deref(), Some("technical_pen_Gray"));
        assert_eq!(second.pen_width, Some(0.15));
    }

    #[test]
    fn unknown_pen_falls_back_to_default() {
        let mut doc = doc_with_layers(1);
        assign_pens(&mut doc, &PenTable::builtin(), &["no_such_pen"]).unwrap();

        let layer = doc.layer(1).unwrap();
        assert_eq!(layer.color, Some(Color::BLACK));
        assert_eq!(layer.pen_width, Some(0.3));
        assert_eq!(layer.name.as_deref(), Some("no_such_pen"));
    }

    #[test]
    fn extra_ids_are_ignored_and_missing_ids_leave_layers_alone() {
        let mut doc = doc_with_layers(2);
        assign_pens(&mut doc, &PenTable::builtin(), &["gel_pen_Blue"]).unwrap();

        assert!(doc.layer(1).unwrap().color.is_some());
        assert!(doc.layer(2).unwrap().color.is_none());

        // More ids than layers
        let mut doc = doc_with_layers(1);
        assign_pens(
            &mut doc,
            &PenTable::builtin(),
            &["gel_pen_Blue", "gel_pen_Green", "gel_pen_Pink"],
        )
        .unwrap();
        assert_eq!(doc.layer_count(), 1);
    }

    #[test]
    fn empty_table_is_rejected() {
        let mut doc = doc_with_layers(1);
        let err = assign_pens(&mut doc, &PenTable::new(), &["anything"]).unwrap_err();
        assert!(matches!(err, PenError::EmptyTable));
    }
}
