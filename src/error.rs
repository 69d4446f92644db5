use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug, Eq, PartialEq)]
pub enum PolicyError {
    InvalidAction(String),
    InvalidPolicy {
        source: String,
        reason: String,
    },
    InvalidPolicyVersion(String),
    InvalidPrincipal(String),
    InvalidRequest(String),
    InvalidResource(String),
    InvalidStatement {
        index: usize,
        sid: Option<String>,
        reason: String,
    },
    MalformedPolicy(String),
    UnknownAction(String),
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidAction(action) => write!(f, "Invalid action: {}", action),
            Self::InvalidPolicy {
                source,
                reason,
            } => write!(f, "Invalid policy for {}: {}", source, reason),
            Self::InvalidPolicyVersion(version) => write!(f, "Invalid policy version: {}", version),
            Self::InvalidPrincipal(principal) => write!(f, "Invalid principal: {}", principal),
            Self::InvalidRequest(reason) => write!(f, "Invalid request: {}", reason),
            Self::InvalidResource(resource) => write!(f, "Invalid resource: {}", resource),
            Self::InvalidStatement {
                index,
                sid,
                reason,
            } => match sid {
                Some(sid) => write!(f, "Invalid statement {} ({}): {}", index, sid, reason),
                None => write!(f, "Invalid statement {}: {}", index, reason),
            },
            Self::MalformedPolicy(reason) => write!(f, "Malformed policy: {}", reason),
            Self::UnknownAction(action) => write!(f, "Unknown action: {}", action),
        }
    }
}

impl Error for PolicyError {}
