use {
    crate::{AccessRequest, Action, Actor, Evaluation, Policy, PolicyError, Resource, Statement},
    log::debug,
    std::{
        collections::HashMap,
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// The source of a policy.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PolicySource {
    /// A resource-based policy attached to a bucket.
    Bucket {
        bucket: String,
        policy_name: Option<String>,
    },

    /// An identity-based policy attached to a principal.
    Identity {
        principal: String,
        policy_name: String,
    },
}

impl Display for PolicySource {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Bucket {
                bucket,
                policy_name: None,
            } => write!(f, "bucket:{}", bucket),
            Self::Bucket {
                bucket,
                policy_name: Some(policy_name),
            } => write!(f, "bucket:{}/{}", bucket, policy_name),
            Self::Identity {
                principal,
                policy_name,
            } => write!(f, "identity:{}/{}", principal, policy_name),
        }
    }
}

#[derive(Clone, Debug)]
struct AttachedPolicy {
    label: String,
    policy: Policy,
    holder: Option<Actor>,
}

/// A set of policies evaluated together: bucket policies plus identity policies attached to principals.
///
/// A matching Deny statement in any policy denies the request. Otherwise a matching Allow statement in any policy
/// allows it. Otherwise the request is implicitly denied.
#[derive(Clone, Debug, Default)]
pub struct PolicySet {
    policies: HashMap<PolicySource, AttachedPolicy>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn get(&self, source: &PolicySource) -> Option<&Policy> {
        self.policies.get(source).map(|attached| &attached.policy)
    }

    pub fn sources(&self) -> impl Iterator<Item = &PolicySource> {
        self.policies.keys()
    }

    /// Add a policy, replacing any policy previously inserted for the same source.
    ///
    /// The policy is validated against its source first. A bucket policy must name a principal in every statement
    /// and may only grant `s3:` actions on the bucket and its objects; an identity policy must not name a principal.
    pub fn insert(&mut self, source: PolicySource, policy: Policy) -> Result<(), PolicyError> {
        let label = source.to_string();
        let invalid = |reason: String| {
            debug!("Rejecting policy for {}: {}", label, reason);
            PolicyError::InvalidPolicy {
                source: label.clone(),
                reason,
            }
        };

        let holder = match &source {
            PolicySource::Bucket {
                bucket,
                ..
            } => {
                for (index, statement) in policy.statement().iter().enumerate() {
                    validate_bucket_statement(bucket, index, statement).map_err(invalid)?;
                }
                None
            }
            PolicySource::Identity {
                principal,
                ..
            } => {
                for (index, statement) in policy.statement().iter().enumerate() {
                    if statement.has_principal() {
                        return Err(invalid(format!(
                            "{} must not have a Principal or NotPrincipal element",
                            describe(index, statement)
                        )));
                    }
                }
                Some(Actor::from_str(principal)?)
            }
        };

        self.policies.insert(
            source,
            AttachedPolicy {
                label,
                policy,
                holder,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, source: &PolicySource) -> Option<Policy> {
        self.policies.remove(source).map(|attached| attached.policy)
    }

    /// Evaluate every statement of every policy in the set against a request.
    pub fn evaluate(&self, request: &AccessRequest) -> Evaluation {
        let matches = self.policies.values().flat_map(|attached| {
            attached.policy.matching_statements(request, Some(attached.label.as_str()), attached.holder.as_ref())
        });

        let evaluation = Evaluation::from_matches(matches);
        debug!("{}: {}", request, evaluation);
        evaluation
    }
}

fn describe(index: usize, statement: &Statement) -> String {
    match statement.sid() {
        Some(sid) => format!("statement {} ({})", index, sid),
        None => format!("statement {}", index),
    }
}

fn validate_bucket_statement(bucket: &str, index: usize, statement: &Statement) -> Result<(), String> {
    if !statement.has_principal() {
        return Err(format!("{} must have a Principal or NotPrincipal element", describe(index, statement)));
    }

    let actions = statement.action().into_iter().chain(statement.not_action()).flat_map(|list| list.iter());
    for action in actions {
        match action {
            Action::Any => (),
            Action::Specific {
                service,
                ..
            } if service.eq_ignore_ascii_case(crate::s3::SERVICE) => (),
            _ => return Err(format!("{} grants non-s3 action {}", describe(index, statement), action)),
        }
    }

    let object_prefix = format!("{}/", bucket);
    let resources = statement.resource().into_iter().chain(statement.not_resource()).flat_map(|list| list.iter());
    for resource in resources {
        match resource {
            Resource::Any => (),
            Resource::Arn(arn) => {
                let pattern = arn.resource_pattern();
                if arn.service_pattern() != crate::s3::SERVICE
                    || !(pattern == bucket || pattern.starts_with(&object_prefix))
                {
                    return Err(format!(
                        "{} refers to {}, which is not bucket {} or an object in it",
                        describe(index, statement),
                        arn,
                        bucket
                    ));
                }
            }
        }
    }

    Ok(())
}
