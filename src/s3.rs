//! Knowledge of the S3 service needed to validate policies and requests: which actions exist, what kind of
//! resource each applies to, and how API operations map onto policy actions.

use {
    scratchstack_arn::Arn,
    serde::Serialize,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// The service prefix for S3 actions and ARNs.
pub const SERVICE: &str = "s3";

/// The kind of resource an S3 action is authorized against.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ResourceLevel {
    /// Not tied to a bucket, e.g. `s3:ListAllMyBuckets`, `s3:CreateJob` or `s3:ListAccessPoints`.
    Account,

    /// A bucket ARN, `arn:aws:s3:::bucket`.
    Bucket,

    /// An object ARN, `arn:aws:s3:::bucket/key`.
    Object,

    /// An S3 Control resource in an account and region: an access point, a batch job, a Storage Lens
    /// configuration or a Multi-Region Access Point, e.g. `arn:aws:s3:us-east-1:123456789012:accesspoint/ap`.
    Control,
}

impl Display for ResourceLevel {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Account => f.write_str("account"),
            Self::Bucket => f.write_str("bucket"),
            Self::Object => f.write_str("object"),
            Self::Control => f.write_str("control"),
        }
    }
}

use ResourceLevel::{Account, Bucket, Control, Object};

static ACTIONS: &[(&str, ResourceLevel)] = &[
    ("AbortMultipartUpload", Object),
    ("BypassGovernanceRetention", Object),
    ("CreateAccessPoint", Control),
    ("CreateAccessPointForObjectLambda", Control),
    ("CreateBucket", Bucket),
    ("CreateJob", Account),
    ("CreateMultiRegionAccessPoint", Control),
    ("CreateSession", Bucket),
    ("DeleteAccessPoint", Control),
    ("DeleteAccessPointForObjectLambda", Control),
    ("DeleteAccessPointPolicy", Control),
    ("DeleteAccessPointPolicyForObjectLambda", Control),
    ("DeleteBucket", Bucket),
    ("DeleteBucketOwnershipControls", Bucket),
    ("DeleteBucketPolicy", Bucket),
    ("DeleteBucketWebsite", Bucket),
    ("DeleteJobTagging", Control),
    ("DeleteMultiRegionAccessPoint", Control),
    ("DeleteObject", Object),
    ("DeleteObjectTagging", Object),
    ("DeleteObjectVersion", Object),
    ("DeleteObjectVersionTagging", Object),
    ("DeleteStorageLensConfiguration", Control),
    ("DeleteStorageLensConfigurationTagging", Control),
    ("DescribeJob", Control),
    ("DescribeMultiRegionAccessPointOperation", Control),
    ("GetAccelerateConfiguration", Bucket),
    ("GetAccessPoint", Control),
    ("GetAccessPointConfigurationForObjectLambda", Control),
    ("GetAccessPointForObjectLambda", Control),
    ("GetAccessPointPolicy", Control),
    ("GetAccessPointPolicyForObjectLambda", Control),
    ("GetAccessPointPolicyStatus", Control),
    ("GetAccessPointPolicyStatusForObjectLambda", Control),
    ("GetAccountPublicAccessBlock", Account),
    ("GetAnalyticsConfiguration", Bucket),
    ("GetBucketAcl", Bucket),
    ("GetBucketCORS", Bucket),
    ("GetBucketLocation", Bucket),
    ("GetBucketLogging", Bucket),
    ("GetBucketNotification", Bucket),
    ("GetBucketObjectLockConfiguration", Bucket),
    ("GetBucketOwnershipControls", Bucket),
    ("GetBucketPolicy", Bucket),
    ("GetBucketPolicyStatus", Bucket),
    ("GetBucketPublicAccessBlock", Bucket),
    ("GetBucketRequestPayment", Bucket),
    ("GetBucketTagging", Bucket),
    ("GetBucketVersioning", Bucket),
    ("GetBucketWebsite", Bucket),
    ("GetEncryptionConfiguration", Bucket),
    ("GetIntelligentTieringConfiguration", Bucket),
    ("GetInventoryConfiguration", Bucket),
    ("GetJobTagging", Control),
    ("GetLifecycleConfiguration", Bucket),
    ("GetMetricsConfiguration", Bucket),
    ("GetMultiRegionAccessPoint", Control),
    ("GetMultiRegionAccessPointPolicy", Control),
    ("GetMultiRegionAccessPointPolicyStatus", Control),
    ("GetMultiRegionAccessPointRoutes", Control),
    ("GetObject", Object),
    ("GetObjectAcl", Object),
    ("GetObjectAttributes", Object),
    ("GetObjectLegalHold", Object),
    ("GetObjectRetention", Object),
    ("GetObjectTagging", Object),
    ("GetObjectTorrent", Object),
    ("GetObjectVersion", Object),
    ("GetObjectVersionAcl", Object),
    ("GetObjectVersionAttributes", Object),
    ("GetObjectVersionForReplication", Object),
    ("GetObjectVersionTagging", Object),
    ("GetObjectVersionTorrent", Object),
    ("GetReplicationConfiguration", Bucket),
    ("GetStorageLensConfiguration", Control),
    ("GetStorageLensConfigurationTagging", Control),
    ("GetStorageLensDashboard", Control),
    ("InitiateReplication", Object),
    ("ListAccessPoints", Account),
    ("ListAccessPointsForObjectLambda", Account),
    ("ListAllMyBuckets", Account),
    ("ListBucket", Bucket),
    ("ListBucketByTags", Bucket),
    ("ListBucketMultipartUploads", Bucket),
    ("ListBucketVersions", Bucket),
    ("ListJobs", Account),
    ("ListMultiRegionAccessPoints", Account),
    ("ListMultipartUploadParts", Object),
    ("ListStorageLensConfigurations", Account),
    ("ObjectOwnerOverrideToBucketOwner", Object),
    ("PutAccelerateConfiguration", Bucket),
    ("PutAccessPointConfigurationForObjectLambda", Control),
    ("PutAccessPointPolicy", Control),
    ("PutAccessPointPolicyForObjectLambda", Control),
    ("PutAccessPointPublicAccessBlock", Account),
    ("PutAccountPublicAccessBlock", Account),
    ("PutAnalyticsConfiguration", Bucket),
    ("PutBucketAcl", Bucket),
    ("PutBucketCORS", Bucket),
    ("PutBucketLogging", Bucket),
    ("PutBucketNotification", Bucket),
    ("PutBucketObjectLockConfiguration", Bucket),
    ("PutBucketOwnershipControls", Bucket),
    ("PutBucketPolicy", Bucket),
    ("PutBucketPublicAccessBlock", Bucket),
    ("PutBucketRequestPayment", Bucket),
    ("PutBucketTagging", Bucket),
    ("PutBucketVersioning", Bucket),
    ("PutBucketWebsite", Bucket),
    ("PutEncryptionConfiguration", Bucket),
    ("PutIntelligentTieringConfiguration", Bucket),
    ("PutInventoryConfiguration", Bucket),
    ("PutJobTagging", Control),
    ("PutLifecycleConfiguration", Bucket),
    ("PutMetricsConfiguration", Bucket),
    ("PutMultiRegionAccessPointPolicy", Control),
    ("PutObject", Object),
    ("PutObjectAcl", Object),
    ("PutObjectLegalHold", Object),
    ("PutObjectRetention", Object),
    ("PutObjectTagging", Object),
    ("PutObjectVersionAcl", Object),
    ("PutObjectVersionTagging", Object),
    ("PutReplicationConfiguration", Bucket),
    ("PutStorageLensConfiguration", Account),
    ("PutStorageLensConfigurationTagging", Control),
    ("ReplicateDelete", Object),
    ("ReplicateObject", Object),
    ("ReplicateTags", Object),
    ("RestoreObject", Object),
    ("SubmitMultiRegionAccessPointRoutes", Control),
    ("UpdateJobPriority", Control),
    ("UpdateJobStatus", Control),
];

/// Every known S3 action (without the `s3:` prefix) and the level it applies to.
pub fn actions() -> impl Iterator<Item = (&'static str, ResourceLevel)> {
    ACTIONS.iter().copied()
}

/// Look up the resource level of an S3 action. Action names are case-insensitive.
pub fn action_level(action: &str) -> Option<ResourceLevel> {
    ACTIONS.iter().find(|(name, _)| name.eq_ignore_ascii_case(action)).map(|(_, level)| *level)
}

/// Whether an S3 ARN names a bucket or an object. Object ARNs carry a `/` after the bucket name.
pub fn resource_level(arn: &Arn) -> ResourceLevel {
    if arn.resource().contains('/') {
        Object
    } else {
        Bucket
    }
}

/// Map an S3 API operation name onto the policy action that authorizes it.
///
/// Operations whose name already is the action (`GetObject`, `PutBucketPolicy`, ...) are returned unchanged.
pub fn action_for_operation(operation: &str) -> &str {
    match operation {
        "ListBuckets" => "ListAllMyBuckets",

        "ListObjects" | "ListObjectsV2" | "HeadBucket" => "ListBucket",
        "ListObjectVersions" => "ListBucketVersions",
        "ListMultipartUploads" => "ListBucketMultipartUploads",

        "HeadObject" | "SelectObjectContent" => "GetObject",
        "ListParts" => "ListMultipartUploadParts",

        "CopyObject" | "CreateMultipartUpload" | "UploadPart" | "UploadPartCopy" | "CompleteMultipartUpload" => {
            "PutObject"
        }
        "DeleteObjects" => "DeleteObject",

        "GetBucketLifecycleConfiguration" => "GetLifecycleConfiguration",
        "PutBucketLifecycleConfiguration" | "DeleteBucketLifecycle" => "PutLifecycleConfiguration",

        "GetBucketReplication" => "GetReplicationConfiguration",
        "PutBucketReplication" | "DeleteBucketReplication" => "PutReplicationConfiguration",

        "GetBucketEncryption" => "GetEncryptionConfiguration",
        "PutBucketEncryption" | "DeleteBucketEncryption" => "PutEncryptionConfiguration",

        "GetBucketAccelerateConfiguration" => "GetAccelerateConfiguration",
        "PutBucketAccelerateConfiguration" => "PutAccelerateConfiguration",

        "GetBucketAnalyticsConfiguration" => "GetAnalyticsConfiguration",
        "PutBucketAnalyticsConfiguration" | "DeleteBucketAnalyticsConfiguration" => "PutAnalyticsConfiguration",

        "GetBucketInventoryConfiguration" => "GetInventoryConfiguration",
        "PutBucketInventoryConfiguration" | "DeleteBucketInventoryConfiguration" => "PutInventoryConfiguration",

        "GetBucketMetricsConfiguration" => "GetMetricsConfiguration",
        "PutBucketMetricsConfiguration" | "DeleteBucketMetricsConfiguration" => "PutMetricsConfiguration",

        "GetBucketIntelligentTieringConfiguration" => "GetIntelligentTieringConfiguration",
        "PutBucketIntelligentTieringConfiguration" | "DeleteBucketIntelligentTieringConfiguration" => {
            "PutIntelligentTieringConfiguration"
        }

        "GetBucketCors" => "GetBucketCORS",
        "PutBucketCors" | "DeleteBucketCors" => "PutBucketCORS",
        "DeleteBucketTagging" => "PutBucketTagging",

        "GetPublicAccessBlock" => "GetBucketPublicAccessBlock",
        "PutPublicAccessBlock" | "DeletePublicAccessBlock" => "PutBucketPublicAccessBlock",

        "GetObjectLockConfiguration" => "GetBucketObjectLockConfiguration",
        "PutObjectLockConfiguration" => "PutBucketObjectLockConfiguration",

        other => other,
    }
}
