//! Shared domain types.
//!
//! Regions, indicators and metrics are closed sets. They are modeled as enums so
//! an invalid value cannot reach the core; the string forms only exist at the
//! edges (log tokens, CLI flags, file names).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Geographic region a record belongs to.
///
/// `Za` is the national series; lines without a region prefix land there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Za,
    Gp,
    Wc,
    Kzn,
    Ec,
    Fs,
    Lp,
    Mp,
    Nc,
    Nw,
}

/// Region code (as written in the log) and display name.
static REGION_TABLE: [(Region, &str, &str); 10] = [
    (Region::Za, "ZA", "South Africa"),
    (Region::Gp, "GP", "Gauteng"),
    (Region::Wc, "WC", "Western Cape"),
    (Region::Kzn, "KZN", "KwaZulu-Natal"),
    (Region::Ec, "EC", "Eastern Cape"),
    (Region::Fs, "FS", "Free State"),
    (Region::Lp, "LP", "Limpopo"),
    (Region::Mp, "MP", "Mpumalanga"),
    (Region::Nc, "NC", "Northern Cape"),
    (Region::Nw, "NW", "North West"),
];

impl Region {
    pub const ALL: [Region; 10] = [
        Region::Za,
        Region::Gp,
        Region::Wc,
        Region::Kzn,
        Region::Ec,
        Region::Fs,
        Region::Lp,
        Region::Mp,
        Region::Nc,
        Region::Nw,
    ];

    fn entry(self) -> &'static (Region, &'static str, &'static str) {
        // The table lists every variant in declaration order.
        &REGION_TABLE[self as usize]
    }

    /// Token used as a line prefix in the log (`GP`, `WC`, ...).
    pub fn code(self) -> &'static str {
        self.entry().1
    }

    pub fn display_name(self) -> &'static str {
        self.entry().2
    }

    /// Lower-case code used in artifact names.
    pub fn slug(self) -> String {
        self.code().to_ascii_lowercase()
    }

    /// Resolve a log prefix token (case-insensitive).
    pub fn from_token(token: &str) -> Option<Region> {
        let token = token.trim();
        REGION_TABLE
            .iter()
            .find(|(_, code, _)| code.eq_ignore_ascii_case(token))
            .map(|(region, _, _)| *region)
    }
}

/// Raw counted quantity tracked per region per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Tests,
    Positive,
    Deaths,
    Recovered,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Tests,
        Indicator::Positive,
        Indicator::Deaths,
        Indicator::Recovered,
    ];

    /// First-field token in the log.
    pub fn token(self) -> &'static str {
        match self {
            Indicator::Tests => "tests",
            Indicator::Positive => "pos",
            Indicator::Deaths => "deaths",
            Indicator::Recovered => "recov",
        }
    }

    pub fn from_token(token: &str) -> Option<Indicator> {
        Indicator::ALL.into_iter().find(|i| i.token() == token)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Indicator::Tests => "Tests Performed",
            Indicator::Positive => "Confirmed Cases",
            Indicator::Deaths => "Confirmed Deaths",
            Indicator::Recovered => "Recoveries",
        }
    }
}

/// Requested output series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Tests,
    Pos,
    Deaths,
    Recov,
    /// Confirmed cases per test performed.
    Positivity,
    /// Recoveries per confirmed case.
    Recovery,
    /// Confirmed cases minus recoveries and deaths.
    Active,
    /// Confirmed cases minus recoveries only (deaths are not subtracted).
    ActiveExclDeaths,
}

/// How a metric is built from the stored indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Direct(Indicator),
    Ratio {
        numerator: Indicator,
        denominator: Indicator,
    },
    Active {
        subtract_deaths: bool,
    },
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Tests,
        Metric::Pos,
        Metric::Deaths,
        Metric::Recov,
        Metric::Positivity,
        Metric::Recovery,
        Metric::Active,
        Metric::ActiveExclDeaths,
    ];

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::Tests => MetricKind::Direct(Indicator::Tests),
            Metric::Pos => MetricKind::Direct(Indicator::Positive),
            Metric::Deaths => MetricKind::Direct(Indicator::Deaths),
            Metric::Recov => MetricKind::Direct(Indicator::Recovered),
            Metric::Positivity => MetricKind::Ratio {
                numerator: Indicator::Positive,
                denominator: Indicator::Tests,
            },
            Metric::Recovery => MetricKind::Ratio {
                numerator: Indicator::Recovered,
                denominator: Indicator::Positive,
            },
            Metric::Active => MetricKind::Active { subtract_deaths: true },
            Metric::ActiveExclDeaths => MetricKind::Active { subtract_deaths: false },
        }
    }

    pub fn display_name(self) -> &'static str {
        match self.kind() {
            MetricKind::Direct(indicator) => indicator.display_name(),
            MetricKind::Ratio { .. } if self == Metric::Positivity => "Positivity Ratio",
            MetricKind::Ratio { .. } => "Recovery Ratio",
            MetricKind::Active { subtract_deaths: true } => "Active Cases",
            MetricKind::Active { subtract_deaths: false } => "Active Cases (Deaths Not Subtracted)",
        }
    }

    /// Stable name used in artifact names and exports.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::Tests => "tests",
            Metric::Pos => "pos",
            Metric::Deaths => "deaths",
            Metric::Recov => "recov",
            Metric::Positivity => "positivity",
            Metric::Recovery => "recovery",
            Metric::Active => "active",
            Metric::ActiveExclDeaths => "active-excl-deaths",
        }
    }
}

/// Running totals or day-over-day deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Cumulative,
    Daily,
}

impl Mode {
    pub fn slug(self) -> &'static str {
        match self {
            Mode::Cumulative => "cumulative",
            Mode::Daily => "daily",
        }
    }
}

/// Y-axis scale. Cosmetic only; the core never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum YScale {
    #[default]
    Linear,
    Log,
}

impl YScale {
    pub fn slug(self) -> &'static str {
        match self {
            YScale::Linear => "linear",
            YScale::Log => "log",
        }
    }
}

/// What daily differencing does when consecutive records are not one
/// calendar day apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Difference against the last emitted point however many days back it is.
    #[default]
    Carry,
    /// A gap re-seeds the previous value; the point after the gap is not emitted.
    Strict,
}

macro_rules! value_enum_from_str {
    ($($ty:ty => $what:literal),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = AppError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    <$ty as ValueEnum>::from_str(s.trim(), true)
                        .map_err(|_| AppError::InvalidQuery(format!("unknown {} `{}`", $what, s)))
                }
            }
        )*
    };
}

value_enum_from_str!(
    Region => "region",
    Metric => "metric",
    Mode => "mode",
    YScale => "y-scale",
    GapPolicy => "gap policy",
);

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One point of a result series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Category of a recoverable, per-record problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Malformed line, unparseable date or non-integer value; the record was dropped.
    ParseSkip,
    /// A composite metric produced a logically impossible (negative) value.
    Anomaly,
    /// Strict gap policy: differencing restarted after a missing day.
    GapReseed,
}

/// A per-record problem that was recovered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based log line, when the problem is tied to one.
    pub line: Option<usize>,
    /// Raw date token involved, if any.
    pub date: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn at_line(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: Some(line),
            date: None,
            message: message.into(),
        }
    }

    pub fn at_date(kind: DiagnosticKind, date: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            date: Some(date.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::ParseSkip => "skip",
            DiagnosticKind::Anomaly => "anomaly",
            DiagnosticKind::GapReseed => "gap",
        };
        match (self.line, self.date.as_deref()) {
            (Some(line), _) => write!(f, "[{kind}] line {line}: {}", self.message),
            (None, Some(date)) => write!(f, "[{kind}] {date}: {}", self.message),
            (None, None) => write!(f, "[{kind}] {}", self.message),
        }
    }
}
