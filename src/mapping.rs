//! Name and tag mapping tables.
//!
//! Static, process-wide lookup tables that reconcile HAProxy's native stats
//! field names with canonical metric identifiers, plus help text and the
//! instance-type decode table. All lookups are total: an unknown name maps
//! to itself and an unknown type code decodes to an empty tag.

use std::collections::HashMap;
use std::sync::LazyLock;

use strum_macros::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Canonical metrics exported on every run, in dispatch order.
pub const METRICS: &[&str] = &[
    "active_servers",
    "backup_servers",
    "bin",
    "bout",
    "chkfail",
    "ctime",
    "dreq",
    "dresp",
    "econ",
    "ereq",
    "eresp",
    "http_response_1xx",
    "http_response_2xx",
    "http_response_3xx",
    "http_response_4xx",
    "http_response_5xx",
    "http_response_other",
    "qcur",
    "qmax",
    "qtime",
    "rate",
    "rtime",
    "scur",
    "slim",
    "smax",
    "ttime",
    "weight",
    "wredis",
    "wretr",
];

/// Gauge label names, in the positional order values are bound.
pub const TAG_LABELS: [&str; 4] = ["proxy", "host", "type", "sv"];

/// `(canonical, native)` pairs for fields whose spellings differ.
const NAME_PAIRS: &[(&str, &str)] = &[
    ("active_servers", "act"),
    ("backup_servers", "bck"),
    ("http_response_1xx", "hrsp_1xx"),
    ("http_response_2xx", "hrsp_2xx"),
    ("http_response_3xx", "hrsp_3xx"),
    ("http_response_4xx", "hrsp_4xx"),
    ("http_response_5xx", "hrsp_5xx"),
    ("http_response_other", "hrsp_other"),
];

/// Help text keyed by native field name.
const HELP: &[(&str, &str)] = &[
    ("act", "Number of active servers (backend), server is active (server)"),
    ("bck", "Number of backup servers (backend), server is backup (server)"),
    ("bin", "Bytes in"),
    ("bout", "Bytes out"),
    ("chkfail", "Number of failed health checks"),
    ("ctime", "Average connect time in ms over the 1024 last requests"),
    ("dreq", "Requests denied because of security concerns"),
    ("dresp", "Responses denied because of security concerns"),
    ("econ", "Number of requests that encountered an error trying to connect to a server"),
    ("ereq", "Request errors"),
    ("eresp", "Response errors"),
    ("hrsp_1xx", "HTTP responses with 1xx code"),
    ("hrsp_2xx", "HTTP responses with 2xx code"),
    ("hrsp_3xx", "HTTP responses with 3xx code"),
    ("hrsp_4xx", "HTTP responses with 4xx code"),
    ("hrsp_5xx", "HTTP responses with 5xx code"),
    ("hrsp_other", "HTTP responses with other codes (protocol error)"),
    ("qcur", "Current queued requests"),
    ("qmax", "Max value of qcur"),
    ("qtime", "Average queue time in ms over the 1024 last requests"),
    ("rate", "Number of sessions per second over the last elapsed second"),
    ("rtime", "Average response time in ms over the 1024 last requests"),
    ("scur", "Current sessions"),
    ("slim", "Configured session limit"),
    ("smax", "Max sessions"),
    ("ttime", "Average total session time in ms over the 1024 last requests"),
    ("weight", "Total weight (backend), server weight (server)"),
    ("wredis", "Number of times a request was redispatched to another server"),
    ("wretr", "Number of times a connection to a server was retried"),
];

static CANONICAL_TO_NATIVE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| NAME_PAIRS.iter().copied().collect());

static NATIVE_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| NAME_PAIRS.iter().map(|&(c, n)| (n, c)).collect());

static HELP_BY_NATIVE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| HELP.iter().copied().collect());

/// Native field name for a canonical metric; identity when unmapped.
pub fn to_native(canonical: &str) -> &str {
    CANONICAL_TO_NATIVE.get(canonical).copied().unwrap_or(canonical)
}

/// Canonical metric for a native field name; identity when unmapped.
pub fn to_canonical(native: &str) -> &str {
    NATIVE_TO_CANONICAL.get(native).copied().unwrap_or(native)
}

/// Human-readable description for a native or canonical name.
///
/// Never empty; unknown names get a generic description.
pub fn help_text(name: &str) -> String {
    match HELP_BY_NATIVE.get(to_native(name)) {
        Some(help) => (*help).to_string(),
        None => format!("HAProxy statistic {name}"),
    }
}

/// Proxy instance type, as encoded in the `type` stats field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr, IntoStaticStr,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum InstanceType {
    Frontend = 0,
    Backend = 1,
    Server = 2,
    Listener = 3,
}

impl InstanceType {
    /// Look up a raw type code.
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    /// Tag value for this instance type.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Decode a raw `type` code into its tag value.
///
/// Out-of-range codes decode to an empty string.
pub fn decode_instance_type(code: i64) -> &'static str {
    InstanceType::from_code(code).map_or("", InstanceType::as_str)
}

/// Label values for one sample, in [`TAG_LABELS`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet {
    pub proxy: String,
    pub host: String,
    pub instance_type: String,
    pub service: String,
}

impl TagSet {
    /// Values positioned to match [`TAG_LABELS`].
    pub fn values(&self) -> [&str; 4] {
        [
            self.proxy.as_str(),
            self.host.as_str(),
            self.instance_type.as_str(),
            self.service.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_native_canonical_round_trip() {
        for &(canonical, native) in NAME_PAIRS {
            assert_eq!(to_native(canonical), native);
            assert_eq!(to_canonical(to_native(canonical)), canonical);
            assert_eq!(to_native(to_canonical(native)), native);
        }
    }

    #[test]
    fn test_unmapped_names_are_identity() {
        assert_eq!(to_native("qcur"), "qcur");
        assert_eq!(to_canonical("qcur"), "qcur");
        assert_eq!(to_native("not_a_metric"), "not_a_metric");
        assert_eq!(to_canonical("not_a_metric"), "not_a_metric");
    }

    #[test]
    fn test_mapping_is_bijective() {
        let natives: HashSet<_> = NAME_PAIRS.iter().map(|(_, n)| n).collect();
        let canonicals: HashSet<_> = NAME_PAIRS.iter().map(|(c, _)| c).collect();
        assert_eq!(natives.len(), NAME_PAIRS.len());
        assert_eq!(canonicals.len(), NAME_PAIRS.len());
        assert!(natives.is_disjoint(&canonicals));
    }

    #[test]
    fn test_every_metric_has_help() {
        for metric in METRICS {
            assert!(
                HELP_BY_NATIVE.contains_key(to_native(metric)),
                "missing help for {metric}"
            );
        }
    }

    #[test]
    fn test_help_text_resolves_both_spellings() {
        assert_eq!(help_text("active_servers"), help_text("act"));
        assert_eq!(help_text("hrsp_5xx"), "HTTP responses with 5xx code");
        assert_eq!(help_text("mystery"), "HAProxy statistic mystery");
    }

    #[test]
    fn test_decode_instance_type() {
        assert_eq!(decode_instance_type(0), "frontend");
        assert_eq!(decode_instance_type(1), "backend");
        assert_eq!(decode_instance_type(2), "server");
        assert_eq!(decode_instance_type(3), "listener");
    }

    #[test]
    fn test_decode_instance_type_out_of_range() {
        for code in [-1, 4, 255, 256, i64::MIN, i64::MAX] {
            assert_eq!(decode_instance_type(code), "");
        }
    }

    #[test]
    fn test_instance_type_display_matches_tag() {
        for kind in InstanceType::iter() {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(InstanceType::from_code(kind as i64), Some(kind));
        }
    }

    #[test]
    fn test_tag_set_order() {
        let tags = TagSet {
            proxy: "web".into(),
            host: "lb-1".into(),
            instance_type: "server".into(),
            service: "s1".into(),
        };
        assert_eq!(tags.values(), ["web", "lb-1", "server", "s1"]);
        assert_eq!(TAG_LABELS, ["proxy", "host", "type", "sv"]);
    }
}
