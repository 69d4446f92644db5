use {
    crate::{
        display_json, statement::StatementVisitor, AccessRequest, Actor, Decision, Effect, Evaluation, PolicyError,
        Statement, StatementList, StatementRef,
    },
    derive_builder::Builder,
    log::{debug, trace},
    serde::{
        de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor},
        ser::{SerializeMap, Serializer},
        Deserialize, Serialize,
    },
    std::{
        cell::RefCell,
        collections::HashSet,
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// Policy versions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolicyVersion {
    None,
    V2008_10_17,
    V2012_10_17,
}

impl PolicyVersion {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[inline]
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }
}

impl Default for PolicyVersion {
    fn default() -> Self {
        Self::None
    }
}

impl Display for PolicyVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => Ok(()),
            Self::V2008_10_17 => f.write_str("2008-10-17"),
            Self::V2012_10_17 => f.write_str("2012-10-17"),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        PolicyVersion::from_str(&value).map_err(de::Error::custom)
    }
}

impl FromStr for PolicyVersion {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2008-10-17" => Ok(Self::V2008_10_17),
            "2012-10-17" => Ok(Self::V2012_10_17),
            _ => Err(PolicyError::InvalidPolicyVersion(s.to_string())),
        }
    }
}

impl Serialize for PolicyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// A policy document: an optional version and identifier plus one or more statements.
///
/// Documents are loaded from JSON through [Policy::from_str], which reports the offending statement by position and
/// `Sid` when a statement cannot be loaded. Duplicate keys are rejected at every level.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct Policy {
    /// The version of the policy: `2008-10-17` or `2012-10-17`. If omitted, this is equivalent to `2008-10-17`.
    #[builder(setter(into, strip_option), default)]
    version: PolicyVersion,

    #[builder(setter(into, strip_option), default)]
    id: Option<String>,

    /// One or more statements. A single statement may be written directly as a map instead of a list.
    #[builder(setter(into))]
    statement: StatementList,
}

impl Policy {
    #[inline]
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[inline]
    pub fn statement(&self) -> &StatementList {
        &self.statement
    }

    /// Load a policy from any serde data format.
    ///
    /// Statement failures are reported as [PolicyError::InvalidStatement]; anything else wrong with the document is a
    /// [PolicyError::MalformedPolicy] or [PolicyError::InvalidPolicyVersion].
    pub fn load<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, PolicyError> {
        let failure = RefCell::new(None);
        let result = deserializer.deserialize_map(PolicyVisitor {
            failure: &failure,
        });

        result.map_err(|e| {
            debug!("Failed to load policy: {}", e);
            failure.take().unwrap_or_else(|| PolicyError::MalformedPolicy(e.to_string()))
        })
    }

    /// Evaluate the policy on its own against a request.
    ///
    /// Every statement is examined. Any matching Deny statement denies the request; otherwise any matching Allow
    /// statement allows it; otherwise the request is implicitly denied ([crate::Decision::DefaultDeny]).
    pub fn evaluate(&self, request: &AccessRequest) -> Evaluation {
        let evaluation = Evaluation::from_matches(self.matching_statements(request, None, None));
        debug!("{}: {}", request, evaluation);
        evaluation
    }

    /// The effect and location of every statement in this policy that matches the request.
    pub(crate) fn matching_statements<'a>(
        &'a self,
        request: &'a AccessRequest,
        label: Option<&'a str>,
        holder: Option<&'a Actor>,
    ) -> impl Iterator<Item = (Effect, StatementRef)> + 'a {
        self.statement.iter().enumerate().filter_map(move |(index, statement)| {
            let decision = statement.evaluate(request, holder);
            trace!("Statement #{} ({:?}) -> {}", index, statement.sid(), decision);

            match decision {
                Decision::DefaultDeny => None,
                _ => Some((*statement.effect(), StatementRef::new(label.map(str::to_string), index, statement.sid()))),
            }
        })
    }
}

/// Remember the most specific failure seen while loading and turn it into a serde error.
fn record<E: de::Error>(failure: &RefCell<Option<PolicyError>>, error: PolicyError) -> E {
    let e = E::custom(&error);
    if failure.borrow().is_none() {
        failure.replace(Some(error));
    }
    e
}

fn statement_failed<E: de::Error>(
    failure: &RefCell<Option<PolicyError>>,
    index: usize,
    sid: Option<String>,
    error: E,
) -> E {
    debug!("Failed to load statement #{}: {}", index, error);
    record(
        failure,
        PolicyError::InvalidStatement {
            index,
            sid,
            reason: error.to_string(),
        },
    )
}

struct PolicyVisitor<'a> {
    failure: &'a RefCell<Option<PolicyError>>,
}

impl<'de, 'a> Visitor<'de> for PolicyVisitor<'a> {
    type Value = Policy;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("a policy document")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut builder = Policy::builder();
        let mut version_seen = false;
        let mut id_seen = false;
        let mut statement_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "Version" => {
                    if version_seen {
                        return Err(de::Error::duplicate_field("Version"));
                    }
                    version_seen = true;
                    let version = access.next_value::<String>()?;
                    match PolicyVersion::from_str(&version) {
                        Ok(version) => {
                            builder.version(version);
                        }
                        Err(e) => return Err(record(self.failure, e)),
                    }
                }
                "Id" => {
                    if id_seen {
                        return Err(de::Error::duplicate_field("Id"));
                    }
                    id_seen = true;
                    builder.id(access.next_value::<String>()?);
                }
                "Statement" => {
                    if statement_seen {
                        return Err(de::Error::duplicate_field("Statement"));
                    }
                    statement_seen = true;
                    builder.statement(access.next_value_seed(StatementListVisitor {
                        failure: self.failure,
                    })?);
                }
                _ => return Err(de::Error::unknown_field(&key, &["Version", "Id", "Statement"])),
            }
        }

        if !statement_seen {
            return Err(de::Error::missing_field("Statement"));
        }

        builder.build().map_err(de::Error::custom)
    }
}

/// Reads the `Statement` element: a single statement map or a non-empty list of them, with unique `Sid`s.
struct StatementListVisitor<'a> {
    failure: &'a RefCell<Option<PolicyError>>,
}

impl<'de, 'a> DeserializeSeed<'de> for StatementListVisitor<'a> {
    type Value = StatementList;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for StatementListVisitor<'a> {
    type Value = StatementList;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("a statement or a list of statements")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        let sid = RefCell::new(None);
        let result = StatementVisitor::recording_sid(&sid).visit_map(access);

        match result {
            Ok(statement) => Ok(StatementList::from(statement)),
            Err(e) => Err(statement_failed(self.failure, 0, sid.take(), e)),
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut statements = Vec::new();
        let mut sids = HashSet::new();

        loop {
            let index = statements.len();
            let sid = RefCell::new(None);
            let result = access.next_element_seed(StatementSeed {
                sid: &sid,
            });

            let statement = match result {
                Ok(Some(statement)) => statement,
                Ok(None) => break,
                Err(e) => return Err(statement_failed(self.failure, index, sid.take(), e)),
            };

            if let Some(sid) = statement.sid() {
                if !sids.insert(sid.to_string()) {
                    let error = PolicyError::InvalidStatement {
                        index,
                        sid: Some(sid.to_string()),
                        reason: "duplicate Sid".to_string(),
                    };
                    return Err(record(self.failure, error));
                }
            }

            statements.push(statement);
        }

        if statements.is_empty() {
            return Err(record(self.failure, PolicyError::MalformedPolicy("Statement must not be empty".to_string())));
        }

        Ok(StatementList::from(statements))
    }
}

struct StatementSeed<'a> {
    sid: &'a RefCell<Option<String>>,
}

impl<'de, 'a> DeserializeSeed<'de> for StatementSeed<'a> {
    type Value = Statement;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(StatementVisitor::recording_sid(self.sid))
    }
}

display_json!(Policy);

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut deserializer = serde_json::Deserializer::from_str(s);
        let policy = Self::load(&mut deserializer)?;
        deserializer.end().map_err(|e| PolicyError::MalformedPolicy(e.to_string()))?;
        Ok(policy)
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Policy, D::Error> {
        let failure = RefCell::new(None);
        d.deserialize_map(PolicyVisitor {
            failure: &failure,
        })
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(None)?;
        if self.version.is_some() {
            state.serialize_entry("Version", &self.version)?;
        }
        if let Some(id) = &self.id {
            state.serialize_entry("Id", id)?;
        }
        state.serialize_entry("Statement", &self.statement)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            serutil::ListKind, AccessRequest, Action, Decision, Effect, Policy, PolicyError, PolicyVersion, Resource,
            Statement, StatementRef,
        },
        indoc::indoc,
        pretty_assertions::assert_eq,
        std::str::FromStr,
    };

    const JIB_POLICY: &str = indoc! { r#"
        {
            "Version": "2012-10-17",
            "Id": "JibBucketPolicy",
            "Statement": [
                {
                    "Sid": "AllowJibIam",
                    "Effect": "Allow",
                    "Principal": {
                        "AWS": "jib_iam"
                    },
                    "Action": [
                        "s3:GetObject",
                        "s3:ListBucket"
                    ],
                    "Resource": [
                        "arn:aws:s3:::jib-bucket",
                        "arn:aws:s3:::jib-bucket/*"
                    ]
                },
                {
                    "Sid": "DenyJib02",
                    "Effect": "Deny",
                    "Principal": {
                        "AWS": "jib02"
                    },
                    "Action": [
                        "s3:GetObject",
                        "s3:ListBucket"
                    ],
                    "Resource": [
                        "arn:aws:s3:::jib-bucket",
                        "arn:aws:s3:::jib-bucket/*"
                    ]
                }
            ]
        }"# };

    fn request(principal: &str, action: &str, resource: &str) -> AccessRequest {
        AccessRequest::new(principal, action, resource).unwrap()
    }

    #[test_log::test]
    fn test_typical_policy_import() {
        let policy = Policy::from_str(JIB_POLICY).unwrap();

        assert_eq!(policy.version(), PolicyVersion::V2012_10_17);
        assert_eq!(policy.id(), Some("JibBucketPolicy"));
        assert_eq!(policy.statement().kind(), ListKind::List);
        assert_eq!(policy.statement().len(), 2);

        let s = &policy.statement()[1];
        assert_eq!(s.sid(), Some("DenyJib02"));
        assert_eq!(*s.effect(), Effect::Deny);
        let actions = s.action().unwrap();
        assert_eq!(actions.kind(), ListKind::List);
        assert_eq!(actions[0].service(), "s3");
        assert_eq!(actions[0].action(), "GetObject");

        assert_eq!(policy.to_string(), JIB_POLICY);

        let deserialized: Policy = serde_json::from_str(JIB_POLICY).unwrap();
        assert_eq!(deserialized, policy);
    }

    #[test_log::test]
    fn test_single_statement() {
        let policy_str = indoc! { r#"
            {
                "Statement": {
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": "s3:GetObject",
                    "Resource": "arn:aws:s3:::jib-bucket/public/*"
                }
            }"# };
        let policy = Policy::from_str(policy_str).unwrap();
        assert_eq!(policy.version(), PolicyVersion::None);
        assert_eq!(policy.id(), None);
        assert_eq!(policy.statement().kind(), ListKind::Single);
        assert_eq!(policy.to_string(), policy_str);

        let e = policy.evaluate(&request("jib02", "s3:GetObject", "arn:aws:s3:::jib-bucket/public/index.html"));
        assert_eq!(e.decision(), Decision::Allow);
        assert_eq!(e.deciding_statements(), &[StatementRef::new(None, 0, None)]);
    }

    #[test_log::test]
    fn test_jib_scenario() {
        let policy = Policy::from_str(JIB_POLICY).unwrap();
        let object = "arn:aws:s3:::jib-bucket/reports/q1.csv";

        let e = policy.evaluate(&request("jib_iam", "s3:GetObject", object));
        assert_eq!(e.decision(), Decision::Allow);
        assert_eq!(e.to_string(), "Allow by #0 (AllowJibIam)");

        let e = policy.evaluate(&request("jib_iam", "s3:ListBucket", "arn:aws:s3:::jib-bucket"));
        assert_eq!(e.decision(), Decision::Allow);

        let e = policy.evaluate(&request("jib02", "s3:GetObject", object));
        assert_eq!(e.decision(), Decision::Deny);
        assert_eq!(e.to_string(), "Deny by #1 (DenyJib02)");

        let e = policy.evaluate(&request("unknown_user", "s3:GetObject", object));
        assert_eq!(e.decision(), Decision::DefaultDeny);
        assert!(e.deciding_statements().is_empty());
        assert_eq!(e.to_string(), "DefaultDeny (no matching statement)");

        let e = policy.evaluate(&request("jib_iam", "s3:PutObject", object));
        assert_eq!(e.decision(), Decision::DefaultDeny);

        let e = policy.evaluate(&request("arn:aws:iam::123456789012:user/jib_iam", "s3:GetObject", object));
        assert_eq!(e.decision(), Decision::Allow);
    }

    #[test_log::test]
    fn test_evaluation_is_deterministic() {
        let policy = Policy::from_str(JIB_POLICY).unwrap();
        let r = request("jib02", "s3:ListBucket", "arn:aws:s3:::jib-bucket");

        let first = policy.evaluate(&r);
        for _ in 0..10 {
            assert_eq!(policy.evaluate(&r), first);
        }
    }

    #[test_log::test]
    fn test_statement_order_is_irrelevant() {
        let policy = Policy::from_str(JIB_POLICY).unwrap();
        let statements: Vec<Statement> = policy.statement().iter().map(|s| (**s).clone()).collect();
        let reversed: Vec<Statement> = statements.iter().rev().cloned().collect();
        let reversed = Policy::builder().statement(reversed).build().unwrap();

        for principal in ["jib_iam", "jib02", "unknown_user"] {
            let r = request(principal, "s3:GetObject", "arn:aws:s3:::jib-bucket/a.txt");
            assert_eq!(policy.evaluate(&r).decision(), reversed.evaluate(&r).decision());
        }
    }

    #[test_log::test]
    fn test_explicit_deny_overrides_allow() {
        let policy = Policy::from_str(indoc! { r#"
            {
                "Statement": [
                    {"Sid": "B", "Effect": "Allow", "Principal": "*", "Action": "s3:*", "Resource": "*"},
                    {"Sid": "A", "Effect": "Allow", "Principal": {"AWS": "jib02"}, "Action": "s3:Get*", "Resource": "*"},
                    {"Sid": "C", "Effect": "Deny", "Principal": {"AWS": "jib02"}, "Action": "s3:GetObject", "Resource": "arn:aws:s3:::jib-bucket/*"}
                ]
            }"# })
        .unwrap();

        let e = policy.evaluate(&request("jib02", "s3:GetObject", "arn:aws:s3:::jib-bucket/a.txt"));
        assert_eq!(e.decision(), Decision::Deny);
        assert_eq!(e.deciding_statements(), &[StatementRef::new(None, 2, Some("C"))]);

        let e = policy.evaluate(&request("jib02", "s3:GetObjectAcl", "arn:aws:s3:::jib-bucket/a.txt"));
        assert_eq!(e.decision(), Decision::Allow);
        assert_eq!(e.to_string(), "Allow by #0 (B), #1 (A)");
    }

    #[test_log::test]
    fn test_bucket_scope_does_not_grant_objects() {
        let policy = Policy::builder()
            .statement(
                Statement::builder()
                    .effect(Effect::Allow)
                    .principal(crate::Principal::Any)
                    .action(Action::from_str("s3:*").unwrap())
                    .resource(Resource::from_str("arn:aws:s3:::jib-bucket").unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let e = policy.evaluate(&request("jib_iam", "s3:GetObject", "arn:aws:s3:::jib-bucket/a.txt"));
        assert_eq!(e.decision(), Decision::DefaultDeny);

        let e = policy.evaluate(&request("jib_iam", "s3:ListBucket", "arn:aws:s3:::jib-bucket"));
        assert_eq!(e.decision(), Decision::Allow);
    }

    #[test_log::test]
    fn test_statement_without_principal_never_matches_alone() {
        let policy = Policy::from_str(r#"{"Statement": {"Effect": "Allow", "Action": "*", "Resource": "*"}}"#).unwrap();
        let e = policy.evaluate(&request("jib_iam", "s3:GetObject", "arn:aws:s3:::jib-bucket/a.txt"));
        assert_eq!(e.decision(), Decision::DefaultDeny);
    }

    #[test_log::test]
    fn test_access_point_and_job_actions() {
        let policy_str = indoc! { r#"
            {
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Sid": "Replication",
                        "Effect": "Allow",
                        "Principal": {"AWS": "jib_iam"},
                        "Action": [
                            "s3:ListBucketByTags",
                            "s3:ObjectOwnerOverrideToBucketOwner",
                            "s3:GetObjectVersionForReplication"
                        ],
                        "Resource": ["arn:aws:s3:::jib-bucket", "arn:aws:s3:::jib-bucket/*"]
                    },
                    {
                        "Sid": "Control",
                        "Effect": "Allow",
                        "Principal": {"AWS": "jib_iam"},
                        "Action": [
                            "s3:PutAccessPointPolicy",
                            "s3:GetAccessPoint",
                            "s3:CreateJob",
                            "s3:ListJobs",
                            "s3:GetStorageLensConfiguration"
                        ],
                        "Resource": "*"
                    }
                ]
            }"# };
        let policy = Policy::from_str(policy_str).unwrap();
        assert_eq!(policy.statement().len(), 2);

        let e = policy.evaluate(&request("jib_iam", "s3:ObjectOwnerOverrideToBucketOwner", "arn:aws:s3:::jib-bucket/a"));
        assert_eq!(e.decision(), Decision::Allow);
        assert_eq!(e.deciding_statements(), &[StatementRef::new(None, 0, Some("Replication"))]);

        let e = policy.evaluate(&request("jib_iam", "s3:ListJobs", "arn:aws:s3:us-east-1:123456789012:job/*"));
        assert_eq!(e.decision(), Decision::Allow);
        assert_eq!(e.deciding_statements(), &[StatementRef::new(None, 1, Some("Control"))]);

        let e = policy.evaluate(&request(
            "jib_iam",
            "s3:GetAccessPoint",
            "arn:aws:s3:us-east-1:123456789012:accesspoint/jib-ap",
        ));
        assert_eq!(e.decision(), Decision::Allow);

        let e = policy.evaluate(&request(
            "jib_iam",
            "s3:DeleteAccessPoint",
            "arn:aws:s3:us-east-1:123456789012:accesspoint/jib-ap",
        ));
        assert_eq!(e.decision(), Decision::DefaultDeny);
    }

    fn assert_malformed(policy_str: &str, prefix: &str) {
        match Policy::from_str(policy_str).unwrap_err() {
            PolicyError::MalformedPolicy(reason) => {
                assert!(reason.starts_with(prefix), "{:?} does not start with {:?}", reason, prefix)
            }
            e => panic!("Expected MalformedPolicy, got {:?}", e),
        }
    }

    fn assert_invalid_statement(policy_str: &str, expected_index: usize, expected_sid: Option<&str>, prefix: &str) {
        match Policy::from_str(policy_str).unwrap_err() {
            PolicyError::InvalidStatement {
                index,
                sid,
                reason,
            } => {
                assert_eq!(index, expected_index);
                assert_eq!(sid.as_deref(), expected_sid);
                assert!(reason.starts_with(prefix), "{:?} does not start with {:?}", reason, prefix);
            }
            e => panic!("Expected InvalidStatement, got {:?}", e),
        }
    }

    #[test_log::test]
    fn test_malformed_documents() {
        assert_malformed("{", "EOF while parsing an object");
        assert_malformed("[]", "invalid type: sequence, expected a policy document");
        assert_malformed(r#"{"Version": "2012-10-17"}"#, "missing field `Statement`");
        assert_malformed(
            r#"{"Comment": "x", "Statement": []}"#,
            "unknown field `Comment`, expected one of `Version`, `Id`, `Statement`",
        );
        assert_malformed(r#"{"Statement": "Deny"}"#, r#"invalid type: string "Deny", expected a statement or a list"#);
        assert_malformed(r#"{"Id": 7, "Statement": []}"#, "invalid type: integer `7`, expected a string");

        let e = Policy::from_str(r#"{"Statement": []}"#).unwrap_err();
        assert_eq!(e.to_string(), "Malformed policy: Statement must not be empty");

        let e = Policy::from_str(r#"{"Version": "2020-01-01", "Statement": []}"#).unwrap_err();
        assert_eq!(e, PolicyError::InvalidPolicyVersion("2020-01-01".to_string()));
    }

    #[test_log::test]
    fn test_duplicate_keys_are_rejected() {
        // A repeated Effect must not let the last value silently win.
        let flip = indoc! { r#"
            {
                "Statement": [
                    {
                        "Sid": "Flip",
                        "Effect": "Deny",
                        "Effect": "Allow",
                        "Principal": "*",
                        "Action": "s3:GetObject",
                        "Resource": "*"
                    }
                ]
            }"# };
        assert_invalid_statement(flip, 0, Some("Flip"), "duplicate field `Effect`");

        let single = r#"{"Statement": {"Effect": "Deny", "Effect": "Allow", "Principal": "*", "Action": "*", "Resource": "*"}}"#;
        assert_invalid_statement(single, 0, None, "duplicate field `Effect`");

        let second = indoc! { r#"
            {
                "Statement": [
                    {"Sid": "A", "Effect": "Deny", "Principal": "*", "Action": "*", "Resource": "*"},
                    {"Sid": "B", "Effect": "Allow", "Principal": "*", "Action": "*", "Resource": "*", "Resource": "*"}
                ]
            }"# };
        assert_invalid_statement(second, 1, Some("B"), "duplicate field `Resource`");

        assert_malformed(
            r#"{"Version": "2012-10-17", "Version": "2008-10-17", "Statement": []}"#,
            "duplicate field `Version`",
        );
        assert_malformed(
            r#"{"Statement": {"Effect": "Deny", "Principal": "*", "Action": "*", "Resource": "*"}, "Statement": {"Effect": "Allow", "Principal": "*", "Action": "*", "Resource": "*"}}"#,
            "duplicate field `Statement`",
        );

        let e = serde_json::from_str::<Policy>(flip).unwrap_err();
        assert!(e.to_string().starts_with("Invalid statement 0 (Flip): duplicate field `Effect`"));
    }

    #[test_log::test]
    fn test_bad_statement_is_named() {
        let policy_str = indoc! { r#"
            {
                "Version": "2012-10-17",
                "Statement": [
                    {"Sid": "Good", "Effect": "Allow", "Principal": "*", "Action": "s3:GetObject", "Resource": "*"},
                    {"Sid": "Bad", "Effect": "Allow", "Principal": "*", "Action": "s3:GetObjekt", "Resource": "*"}
                ]
            }"# };
        assert_invalid_statement(policy_str, 1, Some("Bad"), "Unknown action: s3:GetObjekt");

        assert_invalid_statement(
            r#"{"Statement": [{"Effect": "Allow", "Action": "*"}]}"#,
            0,
            None,
            "Either Resource or NotResource must be set",
        );
        assert_invalid_statement(r#"{"Statement": {"Sid": "Lonely", "Effect": "Allow"}}"#, 0, Some("Lonely"), "Either");
        assert_invalid_statement(r#"{"Statement": ["s3:GetObject"]}"#, 0, None, "invalid type: string");

        let e = Policy::from_str(indoc! { r#"
            {
                "Statement": [
                    {"Sid": "Dup", "Effect": "Allow", "Principal": "*", "Action": "*", "Resource": "*"},
                    {"Sid": "Dup", "Effect": "Deny", "Principal": "*", "Action": "*", "Resource": "*"}
                ]
            }"# })
        .unwrap_err();
        assert_eq!(e.to_string(), "Invalid statement 1 (Dup): duplicate Sid");
    }
}
