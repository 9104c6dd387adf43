// Outlet address resolution.
//
// Callers name outlets either by their label on the switch or by their
// 1-based number; both forms are accepted interchangeably.

use std::fmt;

use dlipower_api::OutletRecord;

use crate::error::CoreError;

/// How a caller identifies an outlet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutletSelector {
    Number(u32),
    /// A label, or a number still in text form (`"06"`).
    Name(String),
}

impl From<u32> for OutletSelector {
    fn from(number: u32) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for OutletSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for OutletSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&OutletSelector> for OutletSelector {
    fn from(selector: &OutletSelector) -> Self {
        selector.clone()
    }
}

impl fmt::Display for OutletSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Map `selector` onto an outlet number in `1..=count`.
///
/// With a live outlet list, a label matches by trimmed equality and a
/// number by equality. Anything unmatched is then read as a number and
/// bounds-checked against `count`, the cached outlet count.
pub fn resolve(
    selector: &OutletSelector,
    outlets: &[OutletRecord],
    count: u32,
) -> Result<u32, CoreError> {
    let matched = match selector {
        OutletSelector::Number(number) => outlets.iter().find(|o| o.number == *number),
        OutletSelector::Name(name) => {
            let name = name.trim();
            outlets.iter().find(|o| o.name.trim() == name)
        }
    };
    if let Some(outlet) = matched {
        return Ok(outlet.number);
    }

    let number = match selector {
        OutletSelector::Number(number) => i64::from(*number),
        OutletSelector::Name(name) => {
            name.trim()
                .parse::<i64>()
                .map_err(|_| CoreError::UnknownOutlet {
                    identifier: name.clone(),
                })?
        }
    };

    if number <= 0 || number > i64::from(count) {
        return Err(CoreError::OutletOutOfRange { number, count });
    }
    u32::try_from(number).map_err(|_| CoreError::OutletOutOfRange { number, count })
}

#[cfg(test)]
mod tests {
    use dlipower_api::OutletState;

    use super::*;

    fn outlets() -> Vec<OutletRecord> {
        vec![
            OutletRecord::new(1, "Router", OutletState::On),
            OutletRecord::new(2, "Cable Modem", OutletState::Off),
            OutletRecord::new(3, "", OutletState::On),
            OutletRecord::new(4, "Lamp", OutletState::Off),
        ]
    }

    #[test]
    fn numbers_in_range_resolve_to_themselves() {
        let list = outlets();
        for n in 1..=4_u32 {
            assert_eq!(resolve(&n.into(), &list, 4).ok(), Some(n));
            assert_eq!(resolve(&n.to_string().into(), &list, 4).ok(), Some(n));
        }
    }

    #[test]
    fn names_resolve_like_their_numbers() {
        let list = outlets();
        for outlet in &list {
            let by_name = resolve(&outlet.name.as_str().into(), &list, 4).ok();
            let by_number = resolve(&outlet.number.to_string().into(), &list, 4).ok();
            assert_eq!(by_name, by_number);
        }
        assert_eq!(resolve(&" Cable Modem ".into(), &list, 4).ok(), Some(2));
    }

    #[test]
    fn padded_numbers_are_equivalent() {
        let list = outlets();
        assert_eq!(resolve(&"04".into(), &list, 4).ok(), Some(4));
        assert_eq!(resolve(&"04".into(), &[], 8).ok(), Some(4));
    }

    #[test]
    fn out_of_range_is_an_error_not_clamped() {
        let list = outlets();
        for selector in [
            OutletSelector::Number(0),
            OutletSelector::Number(5),
            "-1".into(),
            "9".into(),
        ] {
            let err = resolve(&selector, &list, 4).unwrap_err();
            assert!(
                matches!(err, CoreError::OutletOutOfRange { count: 4, .. }),
                "{selector}: {err}"
            );
        }
        let err = resolve(&"12".into(), &list, 4).unwrap_err();
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn unknown_name_names_the_identifier() {
        let err = resolve(&"Toaster".into(), &outlets(), 4).unwrap_err();
        assert!(matches!(err, CoreError::UnknownOutlet { ref identifier } if identifier == "Toaster"));
        assert!(err.to_string().contains("Toaster"));
    }

    #[test]
    fn empty_list_falls_back_to_cached_count() {
        assert_eq!(resolve(&OutletSelector::Number(2), &[], 8).ok(), Some(2));
        assert!(resolve(&OutletSelector::Number(2), &[], 0).is_err());
        assert!(matches!(
            resolve(&"Router".into(), &[], 8),
            Err(CoreError::UnknownOutlet { .. })
        ));
    }
}
