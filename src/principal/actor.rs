use {
    crate::PolicyError,
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
    scratchstack_arn::Arn,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

lazy_static! {
    static ref IAM_NAME: Regex = Regex::new(r"^[A-Za-z0-9+=,.@_-]{1,64}$").unwrap();
    static ref SERVICE_PRINCIPAL: Regex = Regex::new(r"^[a-z0-9][a-z0-9.-]*\.amazonaws\.com(\.cn)?$").unwrap();
}

/// The identity making a request.
///
/// * An ARN, e.g. `arn:aws:iam::123456789012:user/jib_iam`.
/// * An AWS service principal, e.g. `logging.s3.amazonaws.com`.
/// * A bare IAM name, e.g. `jib_iam`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Actor {
    Arn(Arn),
    Service(String),
    Name(String),
}

impl Actor {
    /// The account ID of an ARN actor.
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Self::Arn(arn) => Some(arn.account_id()),
            _ => None,
        }
    }

    /// The name of an actor, if it has one: a bare name, or the final path segment of an IAM user or role ARN.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Arn(arn) => iam_name(arn),
            Self::Service(_) => None,
        }
    }

    /// Whether two actors denote the same identity. A bare name is the same identity as an IAM user or role ARN
    /// ending in that name.
    pub fn same_identity(&self, other: &Actor) -> bool {
        match (self, other) {
            (Self::Name(name), _) => other.name() == Some(name.as_str()),
            (_, Self::Name(name)) => self.name() == Some(name.as_str()),
            _ => self == other,
        }
    }
}

/// The final path segment of an IAM user or role ARN: `jib_iam` for `arn:aws:iam::123456789012:user/dev/jib_iam`.
pub(crate) fn iam_name(arn: &Arn) -> Option<&str> {
    if arn.service() != "iam" {
        return None;
    }

    let (kind, path) = arn.resource().split_once('/')?;
    match kind {
        "user" | "role" => path.rsplit('/').next(),
        _ => None,
    }
}

impl FromStr for Actor {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("arn:") {
            return match Arn::from_str(s) {
                Ok(arn) => Ok(Self::Arn(arn)),
                Err(e) => {
                    debug!("Failed to parse actor ARN {:?}: {}", s, e);
                    Err(PolicyError::InvalidPrincipal(s.to_string()))
                }
            };
        }

        if SERVICE_PRINCIPAL.is_match(s) {
            Ok(Self::Service(s.to_string()))
        } else if IAM_NAME.is_match(s) {
            Ok(Self::Name(s.to_string()))
        } else {
            debug!("Actor {:?} is not an ARN, service principal, or IAM name", s);
            Err(PolicyError::InvalidPrincipal(s.to_string()))
        }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Arn(arn) => arn.fmt(f),
            Self::Service(service) => f.write_str(service),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{Actor, PolicyError},
        pretty_assertions::assert_eq,
        std::str::FromStr,
    };

    #[test_log::test]
    fn test_parse() {
        let user = Actor::from_str("arn:aws:iam::123456789012:user/division/jib_iam").unwrap();
        let role = Actor::from_str("arn:aws:iam::123456789012:role/deployer").unwrap();
        let service = Actor::from_str("logging.s3.amazonaws.com").unwrap();
        let name = Actor::from_str("jib02").unwrap();

        assert!(matches!(user, Actor::Arn(_)));
        assert!(matches!(service, Actor::Service(_)));
        assert!(matches!(name, Actor::Name(_)));

        assert_eq!(user.name(), Some("jib_iam"));
        assert_eq!(user.account_id(), Some("123456789012"));
        assert_eq!(role.name(), Some("deployer"));
        assert_eq!(name.name(), Some("jib02"));
        assert_eq!(service.name(), None);
        assert_eq!(name.account_id(), None);

        assert_eq!(user.to_string(), "arn:aws:iam::123456789012:user/division/jib_iam");
        assert_eq!(service.to_string(), "logging.s3.amazonaws.com");
        assert_eq!(name.to_string(), "jib02");
    }

    #[test_log::test]
    fn test_same_identity() {
        let arn = Actor::from_str("arn:aws:iam::123456789012:user/jib_iam").unwrap();
        let name = Actor::from_str("jib_iam").unwrap();
        let other = Actor::from_str("jib02").unwrap();

        assert!(arn.same_identity(&name));
        assert!(name.same_identity(&arn));
        assert!(name.same_identity(&name.clone()));
        assert!(arn.same_identity(&arn.clone()));
        assert!(!name.same_identity(&other));
        assert!(!arn.same_identity(&other));
    }

    #[test_log::test]
    fn test_root_has_no_name() {
        let root = Actor::from_str("arn:aws:iam::123456789012:root").unwrap();
        assert_eq!(root.name(), None);
    }

    #[test_log::test]
    fn test_bad_actors() {
        for bad in ["", "jib iam", "arn:aws", "a-name-that-is-far-too-long-to-be-an-iam-user-name-because-it-exceeds-64"] {
            assert_eq!(Actor::from_str(bad).unwrap_err(), PolicyError::InvalidPrincipal(bad.to_string()));
        }
    }
}
