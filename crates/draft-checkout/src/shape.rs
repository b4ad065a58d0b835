//! Default form of the checkout builder.

use draft_model::{DraftValue, Record};

pub const GUARANTEE_DAYS: i64 = 7;
pub const GUARANTEE_TEXT: &str =
    "7-Day Guarantee. If you don't like it, we refund your money, no questions asked.";
pub const RESERVED_RIGHTS_TEXT: &str =
    "All rights reserved. This product is protected by copyright.";
pub const HEADLINE_TEXT: &str = "Your transformation starts now!";
pub const TIMER_TEXT: &str = "Limited-time offer";
pub const TIMER_MINUTES: i64 = 15;
pub const MAX_INSTALLMENTS: i64 = 12;

fn fields<const N: usize>(entries: [(&str, DraftValue); N]) -> Record {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn empty() -> DraftValue {
    DraftValue::from("")
}

/// Build a fresh default checkout form.
///
/// Every call returns a new record; callers may mutate it freely.
pub fn checkout_shape() -> Record {
    fields([
        ("name", empty()),
        ("description", empty()),
        ("selectedProduct", empty()),
        ("layout", "horizontal".into()),
        ("customerFields", customer_fields().into()),
        ("packages", vec![default_package().into()].into()),
        ("orderBumps", vec![default_order_bump().into()].into()),
        (
            "guarantee",
            fields([
                ("enabled", true.into()),
                ("days", GUARANTEE_DAYS.into()),
                ("description", GUARANTEE_TEXT.into()),
            ])
            .into(),
        ),
        (
            "reservedRights",
            fields([
                ("enabled", true.into()),
                ("text", RESERVED_RIGHTS_TEXT.into()),
            ])
            .into(),
        ),
        (
            "paymentMethods",
            fields([
                ("pix", true.into()),
                ("creditCard", true.into()),
                ("maxInstallments", MAX_INSTALLMENTS.into()),
                ("installmentsWithInterest", false.into()),
            ])
            .into(),
        ),
        (
            "integrations",
            fields([
                ("selectedMercadoPagoAccount", empty()),
                ("selectedMetaPixel", empty()),
            ])
            .into(),
        ),
        ("support_contact", fields([("email", empty())]).into()),
        ("styles", styles().into()),
        (
            "timer",
            fields([
                ("enabled", false.into()),
                ("duration", TIMER_MINUTES.into()),
                ("color", "#dc2626".into()),
                ("text", TIMER_TEXT.into()),
            ])
            .into(),
        ),
        ("deliverable", deliverable().into()),
    ])
}

fn customer_fields() -> Record {
    fields([
        ("requireName", true.into()),
        ("requireCpf", true.into()),
        ("requirePhone", true.into()),
        ("requireEmail", true.into()),
        ("requireEmailConfirm", true.into()),
    ])
}

/// The single package a new checkout starts with.
pub fn default_package() -> Record {
    fields([
        ("id", 1.into()),
        ("name", empty()),
        ("description", empty()),
        ("topics", vec![empty()].into()),
        ("price", 0.into()),
        ("originalPrice", 0.into()),
        ("mostSold", false.into()),
    ])
}

fn default_order_bump() -> Record {
    fields([
        ("id", 1.into()),
        ("selectedProduct", empty()),
        ("price", 0.into()),
        ("originalPrice", 0.into()),
        ("enabled", false.into()),
    ])
}

fn styles() -> Record {
    fields([
        ("backgroundColor", "#ffffff".into()),
        ("primaryColor", "#3b82f6".into()),
        ("textColor", "#000000".into()),
        ("headlineText", HEADLINE_TEXT.into()),
        ("headlineColor", "#000000".into()),
        ("description", empty()),
        ("gradientColor", "#60a5fa".into()),
        ("highlightColor", "#3b82f6".into()),
    ])
}

fn deliverable() -> Record {
    fields([
        ("type", DeliverableType::None.as_str().into()),
        ("link", empty()),
        ("file", DraftValue::Null),
        ("fileUrl", empty()),
        ("name", empty()),
        ("description", empty()),
    ])
}

/// How the buyer receives the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliverableType {
    #[default]
    None,
    Link,
    Upload,
}

impl DeliverableType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Link => "link",
            Self::Upload => "upload",
        }
    }

    /// Parse the stored `deliverable.type` value.
    pub fn from_value(value: &DraftValue) -> Option<Self> {
        match value.as_str()? {
            "none" => Some(Self::None),
            "link" => Some(Self::Link),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_has_every_section() {
        let shape = checkout_shape();
        let keys: Vec<&str> = shape.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "description",
                "selectedProduct",
                "layout",
                "customerFields",
                "packages",
                "orderBumps",
                "guarantee",
                "reservedRights",
                "paymentMethods",
                "integrations",
                "support_contact",
                "styles",
                "timer",
                "deliverable",
            ]
        );
    }

    #[test]
    fn test_each_call_is_independent() {
        let mut first = checkout_shape();
        first.insert("name".into(), "changed".into());
        assert_eq!(checkout_shape()["name"], DraftValue::from(""));
    }

    #[test]
    fn test_deliverable_type_parse() {
        let shape = checkout_shape();
        let deliverable = shape["deliverable"].as_record().unwrap();
        assert_eq!(
            DeliverableType::from_value(&deliverable["type"]),
            Some(DeliverableType::None)
        );
        assert_eq!(DeliverableType::from_value(&"upload".into()), Some(DeliverableType::Upload));
        assert_eq!(DeliverableType::from_value(&"ftp".into()), None);
        assert!(deliverable["file"].is_null());
    }
}
