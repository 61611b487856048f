use crate::XrError;
use std::fmt;
use std::str::FromStr;

/// The kinds of reference space a session can create.
///
/// The string names only exist at serialization boundaries, see `FromStr`
/// and `as_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum ReferenceSpaceType {
    Viewer,
    Local,
    LocalFloor,
    BoundedFloor,
    Unbounded,
}

impl ReferenceSpaceType {
    pub const VIEWER: &'static str = "viewer";
    pub const LOCAL: &'static str = "local";
    pub const LOCAL_FLOOR: &'static str = "local-floor";
    pub const BOUNDED_FLOOR: &'static str = "bounded-floor";
    pub const UNBOUNDED: &'static str = "unbounded";

    pub const ALL: [ReferenceSpaceType; 5] = [
        ReferenceSpaceType::Viewer,
        ReferenceSpaceType::Local,
        ReferenceSpaceType::LocalFloor,
        ReferenceSpaceType::BoundedFloor,
        ReferenceSpaceType::Unbounded,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            ReferenceSpaceType::Viewer => Self::VIEWER,
            ReferenceSpaceType::Local => Self::LOCAL,
            ReferenceSpaceType::LocalFloor => Self::LOCAL_FLOOR,
            ReferenceSpaceType::BoundedFloor => Self::BOUNDED_FLOOR,
            ReferenceSpaceType::Unbounded => Self::UNBOUNDED,
        }
    }

    pub fn is_valid_type(name: &str) -> bool {
        name.parse::<ReferenceSpaceType>().is_ok()
    }
}

impl FromStr for ReferenceSpaceType {
    type Err = XrError;

    fn from_str(name: &str) -> Result<ReferenceSpaceType, XrError> {
        ReferenceSpaceType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == name)
            .ok_or_else(|| XrError::InvalidReferenceSpaceType(name.to_owned()))
    }
}

impl fmt::Display for ReferenceSpaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back_to_their_type() {
        for ty in ReferenceSpaceType::ALL.iter() {
            assert_eq!(ty.as_str().parse::<ReferenceSpaceType>(), Ok(*ty));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(!ReferenceSpaceType::is_valid_type("stage"));
        assert_eq!(
            "LOCAL".parse::<ReferenceSpaceType>(),
            Err(XrError::InvalidReferenceSpaceType("LOCAL".into()))
        );
    }
}
