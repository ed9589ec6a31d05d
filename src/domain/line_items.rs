use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::billing::{self, InvoiceTotals};
use crate::error::{CollectionError, FieldViolation};

/// One billable row. `tax_rate` is a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    /// Empty row: quantity 1, no price, no tax.
    pub fn blank() -> Self {
        Self::new("", Decimal::ONE, Decimal::ZERO, Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        billing::line_amount(self)
    }

    pub(crate) fn validate_at(&self, index: usize, violations: &mut Vec<FieldViolation>) {
        if self.description.trim().is_empty() {
            violations.push(FieldViolation::new(
                format!("items[{index}].description"),
                "is required",
            ));
        }
        if self.quantity < Decimal::ONE {
            violations.push(FieldViolation::new(
                format!("items[{index}].quantity"),
                "must be at least 1",
            ));
        }
        if self.unit_price < Decimal::ZERO {
            violations.push(FieldViolation::new(
                format!("items[{index}].unit_price"),
                "must be at least 0",
            ));
        }
        if self.tax_rate < Decimal::ZERO {
            violations.push(FieldViolation::new(
                format!("items[{index}].tax_rate"),
                "must be at least 0",
            ));
        }
    }
}

/// Ordered line items, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    pub fn new(first: LineItem) -> Self {
        Self(vec![first])
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LineItem> {
        self.0.get_mut(index)
    }

    pub fn push(&mut self, item: LineItem) {
        self.0.push(item);
    }

    /// Append a blank row and return its index.
    pub fn add_blank(&mut self) -> usize {
        self.0.push(LineItem::blank());
        self.0.len() - 1
    }

    /// Remove the row at `index`. The last remaining row cannot be removed.
    pub fn remove(&mut self, index: usize) -> Result<LineItem, CollectionError> {
        if index >= self.0.len() {
            return Err(CollectionError::validation(
                format!("items[{index}]"),
                "no such line item",
            ));
        }
        if self.0.len() == 1 {
            return Err(CollectionError::validation(
                "items",
                "at least one item is required",
            ));
        }
        Ok(self.0.remove(index))
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.0)
    }

    pub(crate) fn validate(&self, violations: &mut Vec<FieldViolation>) {
        for (index, item) in self.0.iter().enumerate() {
            item.validate_at(index, violations);
        }
    }
}

impl Default for LineItems {
    fn default() -> Self {
        Self::new(LineItem::blank())
    }
}

impl TryFrom<Vec<LineItem>> for LineItems {
    type Error = CollectionError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        if items.is_empty() {
            return Err(CollectionError::validation(
                "items",
                "at least one item is required",
            ));
        }
        Ok(Self(items))
    }
}

impl From<LineItems> for Vec<LineItem> {
    fn from(items: LineItems) -> Self {
        items.0
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn removing_the_sole_item_is_rejected() {
        let mut items = LineItems::default();
        let err = items.remove(0).unwrap_err();
        assert_eq!(
            err,
            CollectionError::validation("items", "at least one item is required")
        );
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn removing_one_of_several_items_recomputes_totals() {
        let mut items = LineItems::new(LineItem::new("Design", dec!(2), dec!(100), dec!(10)));
        items.push(LineItem::new("Hosting", dec!(1), dec!(50), dec!(0)));
        assert_eq!(items.totals().total, dec!(270));

        let removed = items.remove(1).unwrap();
        assert_eq!(removed.description, "Hosting");
        assert_eq!(items.totals().total, dec!(220));
        assert!(items.remove(5).is_err());
    }

    #[test]
    fn empty_list_does_not_deserialize() {
        let err = serde_json::from_str::<LineItems>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one item is required"));

        let items: LineItems = serde_json::from_str(
            r#"[{"description":"Audit","quantity":"1","unit_price":"10.50","tax_rate":"0"}]"#,
        )
        .unwrap();
        assert_eq!(items.as_slice()[0].unit_price, dec!(10.50));
    }

    #[test]
    fn item_violations_carry_their_index() {
        let mut items = LineItems::default();
        items.push(LineItem::new("Ok", dec!(0), dec!(-1), dec!(-5)));
        let mut violations = Vec::new();
        items.validate(&mut violations);
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "items[0].description",
                "items[1].quantity",
                "items[1].unit_price",
                "items[1].tax_rate",
            ]
        );
    }

    #[test]
    fn edits_through_get_mut_change_totals() {
        let mut items = LineItems::default();
        if let Some(item) = items.get_mut(0) {
            item.unit_price = dec!(99.99);
            item.quantity = dec!(3);
        }
        assert_eq!(items.totals().subtotal, dec!(299.97));
        assert_eq!(items.add_blank(), 1);
    }
}
