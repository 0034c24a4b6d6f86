//! Shared HTTP constants (routes, headers, problem URIs, credential heuristics).

pub(crate) const ROUTE_GRAPHQL_PROXY: &str = "/api/graphql-proxy";
pub(crate) const ROUTE_IMPORT_PRODUCTS: &str = "/api/import-products";
pub(crate) const ROUTE_IMPORT_USER_JOBS: &str = "/api/import-user-jobs";

pub(crate) const HEADER_STORE: &str = "store";
pub(crate) const COOKIE_ACCESS_TOKEN: &str = "accessToken";
pub(crate) const PREFLIGHT_ALLOW_HEADERS: &str = "Content-Type, Authorization";

pub(crate) const TARGET_GRAPHQL: &str = "graphql";
pub(crate) const TARGET_IMPORT_PRODUCTS: &str = "import_products";
pub(crate) const TARGET_IMPORT_USER_JOBS: &str = "import_user_jobs";

pub(crate) const PROBLEM_INTERNAL: &str = "https://storegate.dev/problems/internal";
pub(crate) const PROBLEM_UPSTREAM_NOT_CONFIGURED: &str =
    "https://storegate.dev/problems/upstream-not-configured";
pub(crate) const PROBLEM_METHOD_NOT_ALLOWED: &str =
    "https://storegate.dev/problems/method-not-allowed";
pub(crate) const PROBLEM_PAYLOAD_TOO_LARGE: &str =
    "https://storegate.dev/problems/payload-too-large";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://storegate.dev/problems/bad-request";

pub(crate) const DETAIL_PROXY_ERROR: &str = "proxy error";
pub(crate) const DETAIL_NOT_CONFIGURED: &str = "upstream not configured";

/// Operations that authenticate the caller and must never carry a credential.
pub(crate) const LOGIN_OPERATIONS: &[&str] =
    &["GenerateCustomerToken", "ValidateOTP", "ValidateOtpCode"];

/// Untagged values shorter than this are never treated as encrypted blobs.
pub(crate) const ENCRYPTED_MIN_LEN: usize = 80;
