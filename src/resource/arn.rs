use {
    crate::{eval::Glob, PolicyError},
    log::{debug, trace},
    scratchstack_arn::Arn,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// An Amazon Resource Name (ARN) pattern in the `Resource` element of a policy statement.
///
/// This is used to match [scratchstack_arn::Arn] objects from a request. For example, a [ResourceArn] created from
/// `arn:aws:s3:::jib-bucket/*` matches
/// * `arn:aws:s3:::jib-bucket/notes.txt`
/// * `arn:aws:s3:::jib-bucket/logs/2023/01/01.log`
///
/// but not the bucket itself, `arn:aws:s3:::jib-bucket`; that needs its own pattern.
///
/// Patterns are similar to glob statements with a few differences:
/// * The `*` character matches any number of characters, including none, within a single segment of the ARN.
/// * The `?` character matches any single character within a single segment of the ARN.
///
/// Segment patterns are compiled when the [ResourceArn] is created; [ResourceArn] objects are immutable.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct ResourceArn {
    partition: Glob,
    service: Glob,
    region: Glob,
    account_id: Glob,
    resource: Glob,
}

impl ResourceArn {
    /// Create a new ARN pattern from the specified components.
    ///
    /// * `partition` - The partition the resource is in.
    /// * `service` - The service the resource belongs to.
    /// * `region` - The region the resource is in.
    /// * `account_id` - The account ID the resource belongs to.
    /// * `resource` - The resource name.
    pub fn new(
        partition: &str,
        service: &str,
        region: &str,
        account_id: &str,
        resource: &str,
    ) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidResource(format!("arn:{partition}:{service}:{region}:{account_id}:{resource}"));

        if !valid_segment(partition, false) || !valid_segment(service, false) {
            debug!("ARN pattern has an invalid partition {:?} or service {:?}", partition, service);
            return Err(invalid());
        }

        if !valid_segment(region, true) || !valid_segment(account_id, true) {
            debug!("ARN pattern has an invalid region {:?} or account ID {:?}", region, account_id);
            return Err(invalid());
        }

        if resource.is_empty() {
            debug!("ARN pattern has an empty resource");
            return Err(invalid());
        }

        let compile = |segment: &str| {
            Glob::new(segment, false).map_err(|e| {
                debug!("ARN pattern segment {:?} cannot be compiled: {}", segment, e);
                invalid()
            })
        };

        Ok(Self {
            partition: compile(partition)?,
            service: compile(service)?,
            region: compile(region)?,
            account_id: compile(account_id)?,
            resource: compile(resource)?,
        })
    }

    /// Retrieve the partition string pattern.
    #[inline]
    pub fn partition_pattern(&self) -> &str {
        self.partition.as_str()
    }

    /// Retrieve the service string pattern.
    #[inline]
    pub fn service_pattern(&self) -> &str {
        self.service.as_str()
    }

    /// Retrieve the region string pattern.
    #[inline]
    pub fn region_pattern(&self) -> &str {
        self.region.as_str()
    }

    /// Retrieve the account ID string pattern.
    #[inline]
    pub fn account_id_pattern(&self) -> &str {
        self.account_id.as_str()
    }

    /// Retrieve the resource name string pattern.
    #[inline]
    pub fn resource_pattern(&self) -> &str {
        self.resource.as_str()
    }

    /// Indicates whether this [ResourceArn] matches the candidate [Arn].
    ///
    /// # Example
    /// ```
    /// # use s3_policy_eval::ResourceArn;
    /// # use scratchstack_arn::Arn;
    /// # use std::str::FromStr;
    /// let objects = ResourceArn::from_str("arn:aws:s3:::jib-bucket/*").unwrap();
    /// let object_arn = Arn::from_str("arn:aws:s3:::jib-bucket/notes.txt").unwrap();
    /// let bucket_arn = Arn::from_str("arn:aws:s3:::jib-bucket").unwrap();
    /// assert!(objects.matches(&object_arn));
    /// assert!(!objects.matches(&bucket_arn));
    /// ```
    pub fn matches(&self, candidate: &Arn) -> bool {
        let partition_match = self.partition.is_match(candidate.partition());
        let service_match = self.service.is_match(candidate.service());
        let region_match = self.region.is_match(candidate.region());
        let account_id_match = self.account_id.is_match(candidate.account_id());
        let resource_match = self.resource.is_match(candidate.resource());
        let result = partition_match && service_match && region_match && account_id_match && resource_match;

        trace!("arn_pattern_matches: pattern={}, candidate={} -> partition={} service={} region={} account_id={} resource={} -> result={}", self, candidate, partition_match, service_match, region_match, account_id_match, resource_match, result);

        result
    }
}

fn valid_segment(segment: &str, allow_empty: bool) -> bool {
    if segment.is_empty() {
        return allow_empty;
    }

    segment.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'*' || c == b'?')
}

impl FromStr for ResourceArn {
    type Err = PolicyError;

    /// Create an [ResourceArn] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(PolicyError::InvalidResource(s.to_string()));
        }

        Self::new(parts[1], parts[2], parts[3], parts[4], parts[5])
    }
}

impl Display for ResourceArn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "arn:{}:{}:{}:{}:{}", self.partition, self.service, self.region, self.account_id, self.resource)
    }
}
