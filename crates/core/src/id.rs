//! Integer record identifiers.
//!
//! Stores hand out 64-bit integer keys. Each resource wraps them in its own
//! newtype so a customer id can never be passed where another id is expected.
//! [`impl_record_id!`](crate::impl_record_id) fills in the conversions.

/// Implement the record-id plumbing for a `struct X(i64)` newtype.
///
/// Generates `new`/`get`, `Display`, `FromStr` (with [`DomainError::InvalidId`](crate::DomainError)
/// on failure) and the `i64` conversions required by [`Resource::Id`](crate::Resource).
#[macro_export]
macro_rules! impl_record_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::DomainError;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct WidgetId(i64);

    impl_record_id!(WidgetId, "WidgetId");

    #[test]
    fn parses_decimal_ids() {
        let id: WidgetId = "42".parse().unwrap();
        assert_eq!(id, WidgetId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<WidgetId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("WidgetId")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
