//! ERP `systemId` handling

use uuid::Uuid;

/// Parse an ERP `systemId` string, yielding the nil UUID when it is not a GUID
pub fn parse_system_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw.trim()).unwrap_or(Uuid::nil())
}

/// Records that carry an ERP `systemId`
pub trait HasSystemId {
    /// Raw identifier as received from the backend
    fn system_id(&self) -> &str;

    /// Identifier as a UUID, nil when unparsable
    fn system_id_guid(&self) -> Uuid {
        parse_system_id(self.system_id())
    }
}

/// Implements [`HasSystemId`] for DTOs with a `system_id: String` field
#[macro_export]
macro_rules! impl_has_system_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::ids::HasSystemId for $ty {
                fn system_id(&self) -> &str {
                    &self.system_id
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        system_id: String,
    }

    impl_has_system_id!(Row);

    #[test]
    fn test_valid_guid() {
        let id = Uuid::new_v4();
        let row = Row {
            system_id: id.to_string(),
        };
        assert_eq!(row.system_id_guid(), id);
    }

    #[test]
    fn test_braced_and_padded_guid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_system_id(&format!(" {{{}}} ", id)), id);
    }

    #[test]
    fn test_garbage_yields_nil() {
        assert_eq!(parse_system_id("not-a-guid"), Uuid::nil());
        assert_eq!(parse_system_id(""), Uuid::nil());
    }
}
