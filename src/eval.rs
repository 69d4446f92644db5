use {
    crate::{
        s3::{self, ResourceLevel},
        Action, Actor, Effect, PolicyError,
    },
    derive_builder::Builder,
    regex::{Regex, RegexBuilder},
    scratchstack_arn::Arn,
    serde::Serialize,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        hash::{Hash, Hasher},
        str::FromStr,
    },
};

/// A single access attempt: who is asking, which action they want to perform, and on what.
///
/// Requests are validated when built. The action must be concrete (no wildcards), and an `s3:` action must be
/// paired with a resource ARN at the level the action applies to; `s3:GetObject` against a bucket ARN is rejected.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct AccessRequest {
    principal: Actor,
    action: Action,
    resource: Arn,
}

impl AccessRequest {
    pub fn builder() -> AccessRequestBuilder {
        AccessRequestBuilder::default()
    }

    /// Parse a request from its textual parts, e.g. `("jib_iam", "s3:GetObject", "arn:aws:s3:::bucket/key")`.
    pub fn new(principal: &str, action: &str, resource: &str) -> Result<Self, PolicyError> {
        let principal = Actor::from_str(principal)?;
        let action = Action::from_str(action)?;
        let resource = Arn::from_str(resource).map_err(|e| {
            log::debug!("Failed to parse request resource {:?}: {}", resource, e);
            PolicyError::InvalidRequest(format!("{}: {}", resource, e))
        })?;

        Self::builder()
            .principal(principal)
            .action(action)
            .resource(resource)
            .build()
            .map_err(|e| PolicyError::InvalidRequest(e.to_string()))
    }

    #[inline]
    pub fn principal(&self) -> &Actor {
        &self.principal
    }

    #[inline]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[inline]
    pub fn resource(&self) -> &Arn {
        &self.resource
    }

    /// The service half of the requested action.
    #[inline]
    pub fn service(&self) -> &str {
        self.action.service()
    }

    /// The API half of the requested action.
    #[inline]
    pub fn api(&self) -> &str {
        self.action.action()
    }
}

impl Display for AccessRequest {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "principal={} action={} resource={}", self.principal, self.action, self.resource)
    }
}

impl AccessRequestBuilder {
    fn validate(&self) -> Result<(), AccessRequestBuilderError> {
        let action = match &self.action {
            Some(action) => action,
            None => return Ok(()),
        };

        if action.is_any() || action.is_wildcard() {
            return Err(AccessRequestBuilderError::ValidationError(format!(
                "Requested action {} must not contain wildcards.",
                action
            )));
        }

        if !action.service().eq_ignore_ascii_case(s3::SERVICE) {
            return Ok(());
        }

        let resource = match &self.resource {
            Some(resource) => resource,
            None => return Ok(()),
        };

        let action_level = match s3::action_level(action.action()) {
            Some(level) => level,
            None => {
                return Err(AccessRequestBuilderError::ValidationError(format!("Unknown action: {}", action)));
            }
        };

        if action_level == ResourceLevel::Account {
            return Ok(());
        }

        if resource.service() != s3::SERVICE {
            return Err(AccessRequestBuilderError::ValidationError(format!(
                "{} requires an s3 resource, not {}.",
                action, resource
            )));
        }

        // Access points, jobs and Storage Lens configurations carry their own ARN layouts.
        if action_level == ResourceLevel::Control {
            return Ok(());
        }

        let resource_level = s3::resource_level(resource);
        if resource_level != action_level {
            return Err(AccessRequestBuilderError::ValidationError(format!(
                "{} applies to {} ARNs, not {} ({} ARN).",
                action, action_level, resource, resource_level
            )));
        }

        Ok(())
    }
}

/// A compiled glob pattern. `*` matches any run of characters (including none) and `?` matches exactly one.
///
/// Equality and hashing consider only the source pattern.
#[derive(Clone, Debug)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self, regex::Error> {
        let regex = regex_from_glob(pattern).case_insensitive(ignore_case).build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    #[inline]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    #[inline]
    pub fn has_wildcards(&self) -> bool {
        self.pattern.contains(['*', '?'])
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Glob {}

impl Display for Glob {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.pattern)
    }
}

impl Hash for Glob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state)
    }
}

pub(crate) fn regex_from_glob(s: &str) -> RegexBuilder {
    let mut pattern = String::with_capacity(2 + s.len());
    pattern.push('^');

    for c in s.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => {
                let escaped: String = regex::escape(&String::from(c));
                pattern.push_str(&escaped);
            }
        }
    }
    pattern.push('$');
    RegexBuilder::new(&pattern)
}

/// The outcome of a policy evaluation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Decision {
    Allow,
    Deny,
    DefaultDeny,
}

impl Decision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{}",
            match self {
                Decision::Allow => "Allow",
                Decision::Deny => "Deny",
                Decision::DefaultDeny => "DefaultDeny",
            }
        )
    }
}

/// Identifies a statement that took part in a decision.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<String>,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
}

impl StatementRef {
    pub fn new(policy: Option<String>, index: usize, sid: Option<&str>) -> Self {
        Self {
            policy,
            index,
            sid: sid.map(str::to_string),
        }
    }

    /// The policy the statement belongs to, when evaluated as part of a [crate::PolicySet].
    #[inline]
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    /// Zero-based position of the statement in its policy.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }
}

impl Display for StatementRef {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if let Some(policy) = &self.policy {
            f.write_str(policy)?;
        }

        write!(f, "#{}", self.index)?;

        if let Some(sid) = &self.sid {
            write!(f, " ({})", sid)?;
        }

        Ok(())
    }
}

/// A [Decision] together with the statements responsible for it.
///
/// For [Decision::Deny] these are every matching Deny statement; for [Decision::Allow], every matching Allow
/// statement. [Decision::DefaultDeny] has no deciding statements.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Evaluation {
    decision: Decision,
    deciding_statements: Vec<StatementRef>,
}

impl Evaluation {
    /// Resolve the statements that matched a request into a decision: any Deny wins, otherwise any Allow grants
    /// access, otherwise the request is implicitly denied.
    pub fn from_matches<I>(matches: I) -> Self
    where
        I: IntoIterator<Item = (Effect, StatementRef)>,
    {
        let mut allows = Vec::new();
        let mut denies = Vec::new();

        for (effect, statement) in matches {
            if effect.is_deny() {
                denies.push(statement);
            } else {
                allows.push(statement);
            }
        }

        let (decision, mut deciding_statements) = if !denies.is_empty() {
            (Decision::Deny, denies)
        } else if !allows.is_empty() {
            (Decision::Allow, allows)
        } else {
            (Decision::DefaultDeny, Vec::new())
        };

        deciding_statements.sort();

        Self {
            decision,
            deciding_statements,
        }
    }

    #[inline]
    pub fn decision(&self) -> Decision {
        self.decision
    }

    #[inline]
    pub fn deciding_statements(&self) -> &[StatementRef] {
        &self.deciding_statements
    }

    #[inline]
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if self.deciding_statements.is_empty() {
            return write!(f, "{} (no matching statement)", self.decision);
        }

        write!(f, "{} by ", self.decision)?;
        for (i, statement) in self.deciding_statements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", statement)?;
        }

        Ok(())
    }
}
