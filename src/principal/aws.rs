use {
    super::actor::iam_name,
    crate::{Actor, PolicyError},
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
    scratchstack_arn::Arn,
    serde::{
        de::{self, Deserializer, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

lazy_static! {
    static ref AWS_ACCOUNT_ID: Regex = Regex::new(r"^\d{12}$").unwrap();
    static ref IAM_NAME: Regex = Regex::new(r"^[A-Za-z0-9+=,.@_-]{1,64}$").unwrap();
}

/// An entry under the `AWS` key of a statement's `Principal` element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AwsPrincipal {
    /// A 12-digit account ID; matches every ARN actor in that account.
    Account(String),
    Any,
    /// An exact ARN. `arn:aws:iam::123456789012:root` stands for the whole account. A user or role ARN also matches
    /// a bare actor carrying the same name.
    Arn(Arn),
    /// A bare IAM user or role name.
    Name(String),
}

impl AwsPrincipal {
    pub fn matches(&self, actor: &Actor) -> bool {
        match self {
            Self::Any => !matches!(actor, Actor::Service(_)),
            Self::Account(account_id) => actor.account_id() == Some(account_id.as_str()),
            Self::Arn(arn) => match actor {
                Actor::Arn(actor_arn) => {
                    if arn.service() == "iam" && arn.resource() == "root" {
                        actor_arn.partition() == arn.partition() && actor_arn.account_id() == arn.account_id()
                    } else {
                        actor_arn == arn
                    }
                }
                Actor::Name(name) => iam_name(arn) == Some(name.as_str()),
                Actor::Service(_) => false,
            },
            Self::Name(name) => actor.name() == Some(name.as_str()),
        }
    }
}

impl Display for AwsPrincipal {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Account(account_id) => f.write_str(account_id),
            Self::Any => f.write_str("*"),
            Self::Arn(arn) => arn.fmt(f),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for AwsPrincipal {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, PolicyError> {
        if s == "*" {
            Ok(Self::Any)
        } else if AWS_ACCOUNT_ID.is_match(s) {
            Ok(AwsPrincipal::Account(s.to_string()))
        } else if s.starts_with("arn:") {
            match Arn::from_str(s) {
                Ok(arn) => Ok(AwsPrincipal::Arn(arn)),
                Err(e) => {
                    debug!("Failed to parse AWS principal ARN {:?}: {}", s, e);
                    Err(PolicyError::InvalidPrincipal(s.to_string()))
                }
            }
        } else if IAM_NAME.is_match(s) {
            Ok(AwsPrincipal::Name(s.to_string()))
        } else {
            Err(PolicyError::InvalidPrincipal(s.to_string()))
        }
    }
}

struct AwsPrincipalVisitor {}

impl<'de> Visitor<'de> for AwsPrincipalVisitor {
    type Value = AwsPrincipal;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "AWS account ID, ARN, or IAM name")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        AwsPrincipal::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for AwsPrincipal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(AwsPrincipalVisitor {})
    }
}

impl Serialize for AwsPrincipal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{Actor, AwsPrincipal, PolicyError},
        pretty_assertions::{assert_eq, assert_ne},
        std::str::FromStr,
    };

    #[test_log::test]
    fn test_derived() {
        // Just need to verify clone works as expected.
        let ap1a = AwsPrincipal::Any;
        let ap1b = AwsPrincipal::Any;
        let ap2a = AwsPrincipal::Account("123456789012".to_string());
        let ap2b = AwsPrincipal::Account("123456789012".to_string());
        let ap3a = AwsPrincipal::Arn("arn:aws:iam::123456789012:root".parse().unwrap());
        let ap3b = AwsPrincipal::Arn("arn:aws:iam::123456789012:root".parse().unwrap());

        assert_eq!(ap1a, ap1b);
        assert_eq!(ap2a, ap2b);
        assert_eq!(ap3a, ap3b);
        assert_ne!(ap1a, ap2a);
        assert_ne!(ap1a, ap3a);
        assert_ne!(ap2a, ap3a);

        assert_eq!(ap1a.clone(), ap1a);
        assert_eq!(ap2a.clone(), ap2a);
        assert_eq!(ap3a.clone(), ap3a);
    }

    #[test_log::test]
    fn test_parse() {
        assert_eq!(AwsPrincipal::from_str("*").unwrap(), AwsPrincipal::Any);
        assert_eq!(AwsPrincipal::from_str("123456789012").unwrap(), AwsPrincipal::Account("123456789012".to_string()));
        assert_eq!(AwsPrincipal::from_str("jib_iam").unwrap(), AwsPrincipal::Name("jib_iam".to_string()));
        assert!(matches!(
            AwsPrincipal::from_str("arn:aws:iam::123456789012:user/jib02").unwrap(),
            AwsPrincipal::Arn(_)
        ));
        assert_eq!(AwsPrincipal::from_str("arn:aws:").unwrap_err(), PolicyError::InvalidPrincipal("arn:aws:".to_string()));
        assert_eq!(AwsPrincipal::from_str("jib iam").unwrap_err().to_string(), "Invalid principal: jib iam");
    }

    #[test_log::test]
    fn test_matches() {
        let jib_iam = Actor::from_str("arn:aws:iam::123456789012:user/jib_iam").unwrap();
        let jib02 = Actor::from_str("arn:aws:iam::123456789012:user/jib02").unwrap();
        let other_account = Actor::from_str("arn:aws:iam::210987654321:user/jib_iam").unwrap();
        let bare = Actor::from_str("jib_iam").unwrap();
        let service = Actor::from_str("logging.s3.amazonaws.com").unwrap();

        let by_arn = AwsPrincipal::from_str("arn:aws:iam::123456789012:user/jib_iam").unwrap();
        assert!(by_arn.matches(&jib_iam));
        assert!(!by_arn.matches(&jib02));
        assert!(!by_arn.matches(&other_account));
        assert!(by_arn.matches(&bare));
        assert!(!by_arn.matches(&Actor::from_str("jib02").unwrap()));
        assert!(!by_arn.matches(&service));

        let by_root = AwsPrincipal::from_str("arn:aws:iam::123456789012:root").unwrap();
        assert!(by_root.matches(&jib_iam));
        assert!(by_root.matches(&jib02));
        assert!(!by_root.matches(&other_account));
        assert!(!by_root.matches(&Actor::from_str("root").unwrap()));

        let by_account = AwsPrincipal::from_str("123456789012").unwrap();
        assert!(by_account.matches(&jib02));
        assert!(!by_account.matches(&other_account));
        assert!(!by_account.matches(&bare));

        let by_name = AwsPrincipal::from_str("jib_iam").unwrap();
        assert!(by_name.matches(&bare));
        assert!(by_name.matches(&jib_iam));
        assert!(by_name.matches(&other_account));
        assert!(!by_name.matches(&jib02));

        assert!(AwsPrincipal::Any.matches(&bare));
        assert!(!AwsPrincipal::Any.matches(&service));
    }
}
