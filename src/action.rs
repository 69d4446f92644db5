use {
    crate::{eval::Glob, s3, serutil::StringLikeList, PolicyError},
    log::debug,
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

pub type ActionList = StringLikeList<Action>;

/// An action element of a statement, or the action of an access request.
///
/// Actions are written `service:Action`. The action half may contain `*` wildcards; both halves compare
/// case-insensitively. `s3:` actions are checked against the known S3 actions when they are created.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Any,
    Specific {
        service: String,
        action: Glob,
    },
}

impl Action {
    pub fn new<S: Into<String>, A: Into<String>>(service: S, action: A) -> Result<Self, PolicyError> {
        let service = service.into();
        let action = action.into();

        if service.is_empty() {
            debug!("Action '{service}:{action}' has an empty service.");
            return Err(PolicyError::InvalidAction(format!("{}:{}", service, action)));
        }

        if action.is_empty() {
            debug!("Action '{service}:{action}' has an empty action.");
            return Err(PolicyError::InvalidAction(format!("{}:{}", service, action)));
        }

        if !service.is_ascii() || !action.is_ascii() {
            debug!("Action '{service}:{action}' is not ASCII.");
            return Err(PolicyError::InvalidAction(format!("{}:{}", service, action)));
        }

        for (i, c) in service.bytes().enumerate() {
            if !c.is_ascii_alphanumeric() && !(i > 0 && i < service.len() - 1 && (c == b'-' || c == b'_')) {
                debug!("Action '{service}:{action}' has an invalid service.");
                return Err(PolicyError::InvalidAction(format!("{}:{}", service, action)));
            }
        }

        for (i, c) in action.bytes().enumerate() {
            if !c.is_ascii_alphanumeric() && c != b'*' && !(i > 0 && i < action.len() - 1 && (c == b'-' || c == b'_')) {
                debug!("Action '{service}:{action}' has an invalid action.");
                return Err(PolicyError::InvalidAction(format!("{}:{}", service, action)));
            }
        }

        let pattern = Glob::new(&action, true).map_err(|e| {
            debug!("Action '{service}:{action}' cannot be compiled: {e}");
            PolicyError::InvalidAction(format!("{}:{}", service, action))
        })?;

        if service.eq_ignore_ascii_case(s3::SERVICE) {
            let known = if pattern.has_wildcards() {
                s3::actions().any(|(name, _)| pattern.is_match(name))
            } else {
                s3::action_level(&action).is_some()
            };

            if !known {
                debug!("Action '{service}:{action}' does not name any S3 action.");
                return Err(PolicyError::UnknownAction(format!("{}:{}", service, action)));
            }
        }

        Ok(Action::Specific {
            service,
            action: pattern,
        })
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Whether the action half contains a wildcard. [Action::Any] is reported separately by [Action::is_any].
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Any => false,
            Self::Specific {
                action,
                ..
            } => action.has_wildcards(),
        }
    }

    #[inline]
    pub fn service(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Specific {
                service,
                ..
            } => service,
        }
    }

    #[inline]
    pub fn action(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Specific {
                action,
                ..
            } => action.as_str(),
        }
    }

    /// Indicates whether this action pattern covers the given service and API name.
    pub fn matches(&self, service: &str, api: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Specific {
                service: my_service,
                action,
            } => my_service.eq_ignore_ascii_case(service) && action.is_match(api),
        }
    }
}

impl FromStr for Action {
    type Err = PolicyError;
    fn from_str(v: &str) -> Result<Self, Self::Err> {
        if v == "*" {
            return Ok(Self::Any);
        }

        let parts: Vec<&str> = v.split(':').collect();
        if parts.len() != 2 {
            return Err(PolicyError::InvalidAction(v.to_string()));
        }

        Action::new(parts[0], parts[1])
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Any => f.write_str("*"),
            Self::Specific {
                service,
                action,
            } => write!(f, "{}:{}", service, action),
        }
    }
}

struct ActionVisitor {}
impl<'de> Visitor<'de> for ActionVisitor {
    type Value = Action;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "service:action or \"*\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Action::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ActionVisitor {})
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
