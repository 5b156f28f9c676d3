//! Submission form schema and run-parameter validation.
//!
//! A submission arrives as a flat map of named strings. [`SubmissionForm`]
//! fixes the schema (absence of any key is an input error), and
//! [`validate`] sanitizes every numeric option, produces the ordered
//! `key=value` lines for the parameter log, and checks the documented
//! constraints in declaration order, stopping at the first violation.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static NOT_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9\-]").expect("integer sanitizer pattern is valid"));

static NOT_FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9,.\-]").expect("float sanitizer pattern is valid"));

/// Keep only digits and `-`.
pub fn sanitize_int(raw: &str) -> String {
    NOT_INT_RE.replace_all(raw, "").into_owned()
}

/// Keep only digits, `-`, `.` and `,`, then turn commas into dots.
pub fn sanitize_float(raw: &str) -> String {
    NOT_FLOAT_RE.replace_all(raw, "").replace(',', ".")
}

// =============================================================================
// FORM SCHEMA
// =============================================================================

/// Form key of the primer sequences.
pub const FIELD_SEQUENCES: &str = "fastaText";

/// Form key of the genome index reference.
pub const FIELD_GENOME: &str = "genome";

/// Whether a numeric option is parsed as an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Int,
    Float,
}

/// Documented range of a numeric option.
///
/// `bound` is the range as shown to the user after `must be`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Any value is accepted.
    Unbounded,
    AtLeast { min: f64, bound: &'static str },
    /// `>= min`, or exactly `sentinel`.
    AtLeastOr {
        min: f64,
        sentinel: f64,
        bound: &'static str,
    },
    OneOf {
        allowed: &'static [i64],
        bound: &'static str,
    },
}

impl Constraint {
    /// Violation message, or `None` when `value` is in range.
    fn check(&self, label: &str, value: Value) -> Option<String> {
        let v = value.as_f64();
        match *self {
            Constraint::Unbounded => None,
            Constraint::AtLeast { min, bound } => {
                (v < min).then(|| format!("{} must be >= {}", label, bound))
            }
            Constraint::AtLeastOr {
                min,
                sentinel,
                bound,
            } => (v < min && v != sentinel).then(|| format!("{} must be >= {}", label, bound)),
            Constraint::OneOf { allowed, bound } => (!allowed.contains(&value.as_i64()))
                .then(|| format!("{} must be {}", label, bound)),
        }
    }
}

/// Declaration of one numeric run option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    /// Key in the submitted form.
    pub form_key: &'static str,
    /// Key written to the parameter log and used as the tool flag name.
    pub log_key: &'static str,
    pub kind: NumberKind,
    pub constraint: Constraint,
    /// Human-readable option name for error messages.
    pub label: &'static str,
}

/// Numeric options in validation order.
pub const OPTIONS: [OptionDef; 12] = [
    OptionDef {
        form_key: "setAmpSize",
        log_key: "maxProdSize",
        kind: NumberKind::Int,
        constraint: Constraint::Unbounded,
        label: "Maximal PCR Product Size",
    },
    OptionDef {
        form_key: "setTmCutoff",
        log_key: "cutTemp",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 30.0,
            bound: "30°C",
        },
        label: "Minimal Primer Tm",
    },
    OptionDef {
        form_key: "setKmer",
        log_key: "kmer",
        kind: NumberKind::Int,
        constraint: Constraint::AtLeast {
            min: 15.0,
            bound: "15 bp",
        },
        label: "Number of bp Used to Search for Matches",
    },
    OptionDef {
        form_key: "setDist",
        log_key: "distance",
        kind: NumberKind::Int,
        constraint: Constraint::OneOf {
            allowed: &[0, 1],
            bound: "0 or 1",
        },
        label: "Maximal Allowed Number of Mutations",
    },
    OptionDef {
        form_key: "setCutoffPen",
        log_key: "cutoffPenalty",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeastOr {
            min: 0.0,
            sentinel: CUTOFF_PENALTY_DISABLED,
            bound: "0.0 or -1",
        },
        label: "Keep Only PCR Products with Penalty Below",
    },
    OptionDef {
        form_key: "setPenTmDiff",
        log_key: "penaltyTmDiff",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0",
        },
        label: "Penalty Factor for Single Primer Tm Mismatch",
    },
    OptionDef {
        form_key: "setPenTmMismatch",
        log_key: "penaltyTmMismatch",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0",
        },
        label: "Penalty Factor for Tm Mismatch of Primers in a Pair",
    },
    OptionDef {
        form_key: "setPenLength",
        log_key: "penaltyLength",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0",
        },
        label: "Penalty Factor for PCR Product Length",
    },
    OptionDef {
        form_key: "setCtmMv",
        log_key: "monovalent",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0 mMol",
        },
        label: "Concentration of Monovalent Ions",
    },
    OptionDef {
        form_key: "setCtmDv",
        log_key: "divalent",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0 mMol",
        },
        label: "Concentration of Divalent Ions",
    },
    OptionDef {
        form_key: "setCtmDNA",
        log_key: "dna",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.1,
            bound: "0.1 nMol",
        },
        label: "Concentration of Annealing(!) Oligos",
    },
    OptionDef {
        form_key: "setCtmDNTP",
        log_key: "dntp",
        kind: NumberKind::Float,
        constraint: Constraint::AtLeast {
            min: 0.0,
            bound: "0.0 mMol",
        },
        label: "Concentration of the Sum of All dNTPs",
    },
];

/// A submission with every required key present.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    sequences: String,
    genome: String,
    options: HashMap<&'static str, String>,
}

impl SubmissionForm {
    /// Check the fixed schema. Unknown keys are ignored.
    pub fn from_fields(mut fields: HashMap<String, String>) -> Result<Self> {
        let mut take = |key: &str| {
            fields
                .remove(key)
                .ok_or_else(|| Error::Input(format!("Missing required field: {}", key)))
        };

        let sequences = take(FIELD_SEQUENCES)?;
        let genome = take(FIELD_GENOME)?;
        let mut options = HashMap::with_capacity(OPTIONS.len());
        for opt in OPTIONS.iter() {
            options.insert(opt.form_key, take(opt.form_key)?);
        }

        Ok(Self {
            sequences,
            genome,
            options,
        })
    }

    /// Primer sequences with CRLF normalized to LF.
    pub fn sequences(&self) -> String {
        self.sequences.replace("\r\n", "\n")
    }

    /// Genome index reference as submitted.
    pub fn genome(&self) -> &str {
        &self.genome
    }

    /// Raw value of a numeric option, by form key.
    pub fn option(&self, form_key: &str) -> Option<&str> {
        self.options.get(form_key).map(String::as_str)
    }

    /// Reject empty sequences and unusable genome references.
    ///
    /// Returns the primer text (normalized) and the resolved genome path.
    pub fn check_inputs(&self, genome_root: &Path) -> Result<(String, PathBuf)> {
        let sequences = self.sequences();
        if sequences.trim().is_empty() {
            return Err(Error::Input("Please provide a set of primers!".to_string()));
        }
        let genome = resolve_genome(genome_root, &self.genome)?;
        Ok((sequences, genome))
    }
}

/// Resolve a genome reference to an existing index under `genome_root`.
///
/// The reference must be one plain file name; separators, `..` and
/// absolute paths are rejected.
pub fn resolve_genome(genome_root: &Path, reference: &str) -> Result<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(Error::Input("Please select a genome!".to_string()));
    }

    let mut components = Path::new(reference).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal {
        return Err(Error::Input(format!("Invalid genome reference: {}", reference)));
    }

    let path = genome_root.join(reference);
    if !path.exists() {
        return Err(Error::Input(format!("Genome index not found: {}", reference)));
    }
    Ok(path)
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Canonical, typed run parameters of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub genome: PathBuf,
    pub max_product_size: i64,
    pub melting_temp_cutoff: f64,
    pub seed_length: i64,
    pub max_mismatches: i64,
    /// `-1` disables the penalty cutoff.
    pub cutoff_penalty: f64,
    pub penalty_tm_diff: f64,
    pub penalty_tm_mismatch: f64,
    pub penalty_length: f64,
    pub monovalent_conc: f64,
    pub divalent_conc: f64,
    pub oligo_conc: f64,
    pub dntp_conc: f64,
}

/// Sentinel for [`ParameterRecord::cutoff_penalty`] meaning "keep all".
pub const CUTOFF_PENALTY_DISABLED: f64 = -1.0;

/// Result of validating a submission's options.
#[derive(Debug)]
pub struct Validation {
    /// `(log_key, sanitized value)` in log order, genome first.
    pub sanitized: Vec<(&'static str, String)>,
    /// Typed record, or the first violated constraint.
    pub outcome: std::result::Result<ParameterRecord, Error>,
}

impl Validation {
    /// Parameter log content (`key=value\n` per field).
    pub fn log_lines(&self) -> String {
        self.sanitized
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, value))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v as i64,
        }
    }
}

fn parse_value(opt: &OptionDef, sanitized: &str) -> std::result::Result<Value, Error> {
    let parsed = match opt.kind {
        NumberKind::Int => sanitized.parse::<i64>().ok().map(Value::Int),
        NumberKind::Float => sanitized
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Float),
    };
    parsed.ok_or_else(|| {
        Error::validation(
            opt.form_key,
            format!("{} must be a number (got '{}')", opt.label, sanitized),
        )
    })
}

/// Sanitize and validate every numeric option of `form`.
///
/// `genome` is the already resolved genome path; it heads the log lines.
/// Every option is sanitized and logged even when an earlier one fails.
pub fn validate(form: &SubmissionForm, genome: &Path) -> Validation {
    let mut sanitized = Vec::with_capacity(OPTIONS.len() + 1);
    sanitized.push((FIELD_GENOME, genome.display().to_string()));

    let mut first_error: Option<Error> = None;
    let mut values = Vec::with_capacity(OPTIONS.len());

    for opt in OPTIONS.iter() {
        let raw = form.option(opt.form_key).unwrap_or_default();
        let clean = match opt.kind {
            NumberKind::Int => sanitize_int(raw),
            NumberKind::Float => sanitize_float(raw),
        };

        match parse_value(opt, &clean) {
            Ok(value) => {
                if first_error.is_none() {
                    if let Some(message) = opt.constraint.check(opt.label, value) {
                        first_error = Some(Error::validation(opt.form_key, message));
                    }
                }
                values.push(value);
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
                values.push(Value::Int(0));
            }
        }
        sanitized.push((opt.log_key, clean));
    }

    let outcome = match first_error {
        Some(e) => Err(e),
        None => Ok(ParameterRecord {
            genome: genome.to_path_buf(),
            max_product_size: values[0].as_i64(),
            melting_temp_cutoff: values[1].as_f64(),
            seed_length: values[2].as_i64(),
            max_mismatches: values[3].as_i64(),
            cutoff_penalty: values[4].as_f64(),
            penalty_tm_diff: values[5].as_f64(),
            penalty_tm_mismatch: values[6].as_f64(),
            penalty_length: values[7].as_f64(),
            monovalent_conc: values[8].as_f64(),
            divalent_conc: values[9].as_f64(),
            oligo_conc: values[10].as_f64(),
            dntp_conc: values[11].as_f64(),
        }),
    };

    Validation { sanitized, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every option at its documented minimum valid value.
    fn minimal_fields() -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = [
            ("setAmpSize", "15000"),
            ("setTmCutoff", "30.0"),
            ("setKmer", "15"),
            ("setDist", "0"),
            ("setCutoffPen", "-1"),
            ("setPenTmDiff", "0.0"),
            ("setPenTmMismatch", "0.0"),
            ("setPenLength", "0.0"),
            ("setCtmMv", "0.0"),
            ("setCtmDv", "0.0"),
            ("setCtmDNA", "0.1"),
            ("setCtmDNTP", "0.0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        fields.insert(FIELD_SEQUENCES.to_string(), ">P1\nACGT".to_string());
        fields.insert(FIELD_GENOME.to_string(), "refA".to_string());
        fields
    }

    fn validate_fields(fields: HashMap<String, String>) -> Validation {
        let form = SubmissionForm::from_fields(fields).unwrap();
        validate(&form, Path::new("/genomes/refA"))
    }

    fn failing_field(validation: &Validation) -> &'static str {
        match validation.outcome {
            Err(Error::Validation { field, .. }) => field,
            ref other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_sanitize_int_strips_everything_but_digits_and_sign() {
        assert_eq!(sanitize_int(" 15 bp"), "15");
        assert_eq!(sanitize_int("-1.5"), "-15");
        assert_eq!(sanitize_int("abc"), "");
    }

    #[test]
    fn test_sanitize_float_normalizes_comma() {
        assert_eq!(sanitize_float("0,5 mM"), "0.5");
        assert_eq!(sanitize_float("58.0°C"), "58.0");
        assert_eq!(sanitize_float("-1"), "-1");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in ["12,5x", " -3 ", "1.2.3", "4e5", "", "0,1"] {
            let once = sanitize_float(raw);
            assert_eq!(sanitize_float(&once), once);
            let once = sanitize_int(raw);
            assert_eq!(sanitize_int(&once), once);
        }
    }

    #[test]
    fn test_minimal_valid_values_accepted() {
        let validation = validate_fields(minimal_fields());
        let record = validation.outcome.as_ref().unwrap();
        assert_eq!(record.melting_temp_cutoff, 30.0);
        assert_eq!(record.seed_length, 15);
        assert_eq!(record.max_mismatches, 0);
        assert_eq!(record.cutoff_penalty, CUTOFF_PENALTY_DISABLED);
        assert_eq!(record.oligo_conc, 0.1);
        assert_eq!(record.genome, PathBuf::from("/genomes/refA"));
    }

    #[test]
    fn test_record_equals_sanitized_values() {
        let mut fields = minimal_fields();
        fields.insert("setTmCutoff".into(), "45,5 C".into());
        fields.insert("setKmer".into(), "k=17".into());
        let validation = validate_fields(fields);
        let record = validation.outcome.as_ref().unwrap();

        let logged: HashMap<_, _> = validation.sanitized.iter().cloned().collect();
        assert_eq!(logged["cutTemp"], "45.5");
        assert_eq!(logged["kmer"], "17");
        assert_eq!(record.melting_temp_cutoff, 45.5);
        assert_eq!(record.seed_length, 17);
    }

    #[test]
    fn test_each_single_violation_is_reported() {
        let cases = [
            ("setTmCutoff", "29.9"),
            ("setKmer", "14"),
            ("setDist", "2"),
            ("setCutoffPen", "-0.5"),
            ("setPenTmDiff", "-0.1"),
            ("setPenTmMismatch", "-1"),
            ("setPenLength", "-0.001"),
            ("setCtmMv", "-5"),
            ("setCtmDv", "-1,5"),
            ("setCtmDNA", "0.09"),
            ("setCtmDNTP", "-0.6"),
        ];
        for (key, bad) in cases {
            let mut fields = minimal_fields();
            fields.insert(key.to_string(), bad.to_string());
            let validation = validate_fields(fields);
            assert_eq!(failing_field(&validation), key, "value {}", bad);
        }
    }

    #[test]
    fn test_every_option_but_product_size_is_constrained() {
        let unbounded: Vec<&str> = OPTIONS
            .iter()
            .filter(|o| o.constraint == Constraint::Unbounded)
            .map(|o| o.log_key)
            .collect();
        assert_eq!(unbounded, vec!["maxProdSize"]);
    }

    #[test]
    fn test_constraint_messages() {
        let cutoff = OPTIONS[4];
        assert_eq!(cutoff.log_key, "cutoffPenalty");
        assert_eq!(cutoff.constraint.check(cutoff.label, Value::Float(-1.0)), None);
        assert_eq!(
            cutoff.constraint.check(cutoff.label, Value::Float(-1.5)),
            Some("Keep Only PCR Products with Penalty Below must be >= 0.0 or -1".to_string())
        );

        let distance = OPTIONS[3];
        assert_eq!(
            distance.constraint.check(distance.label, Value::Int(2)),
            Some("Maximal Allowed Number of Mutations must be 0 or 1".to_string())
        );
        let dna = OPTIONS[10];
        assert!(dna
            .constraint
            .check(dna.label, Value::Float(0.05))
            .unwrap()
            .ends_with(">= 0.1 nMol"));
    }

    #[test]
    fn test_first_violation_wins() {
        let mut fields = minimal_fields();
        fields.insert("setCtmDNA".into(), "0".into());
        fields.insert("setKmer".into(), "3".into());
        let validation = validate_fields(fields);
        assert_eq!(failing_field(&validation), "setKmer");
    }

    #[test]
    fn test_tm_message_names_option_and_range() {
        let mut fields = minimal_fields();
        fields.insert("setTmCutoff".into(), "29.9".into());
        let validation = validate_fields(fields);
        let message = validation.outcome.unwrap_err().to_string();
        assert!(message.contains("Minimal Primer Tm"));
        assert!(message.contains(">= 30"));
    }

    #[test]
    fn test_all_fields_logged_even_on_failure() {
        let mut fields = minimal_fields();
        fields.insert("setTmCutoff".into(), "10".into());
        let validation = validate_fields(fields);
        assert!(validation.outcome.is_err());
        assert_eq!(validation.sanitized.len(), OPTIONS.len() + 1);
        let log = validation.log_lines();
        assert!(log.starts_with("genome=/genomes/refA\n"));
        assert!(log.contains("cutTemp=10\n"));
        assert!(log.ends_with("dntp=0.0\n"));
    }

    #[test]
    fn test_unparseable_value_is_validation_error() {
        let mut fields = minimal_fields();
        fields.insert("setPenLength".into(), "1.2.3".into());
        let validation = validate_fields(fields);
        assert_eq!(failing_field(&validation), "setPenLength");

        let mut fields = minimal_fields();
        fields.insert("setAmpSize".into(), "none".into());
        let validation = validate_fields(fields);
        assert_eq!(failing_field(&validation), "setAmpSize");
    }

    #[test]
    fn test_cutoff_penalty_sentinel() {
        for ok in ["-1", "-1.0", "0", "2.5"] {
            let mut fields = minimal_fields();
            fields.insert("setCutoffPen".into(), ok.into());
            assert!(validate_fields(fields).outcome.is_ok(), "{}", ok);
        }
        for bad in ["-2", "-1.5", "-0.0001"] {
            let mut fields = minimal_fields();
            fields.insert("setCutoffPen".into(), bad.into());
            assert!(validate_fields(fields).outcome.is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_missing_field_is_input_error() {
        let mut fields = minimal_fields();
        fields.remove("setCtmDNTP");
        let err = SubmissionForm::from_fields(fields).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert!(err.to_string().contains("setCtmDNTP"));
    }

    #[test]
    fn test_sequences_crlf_normalized() {
        let mut fields = minimal_fields();
        fields.insert(FIELD_SEQUENCES.into(), ">P1\r\nACGT\r\n".into());
        let form = SubmissionForm::from_fields(fields).unwrap();
        assert_eq!(form.sequences(), ">P1\nACGT\n");
    }

    #[test]
    fn test_check_inputs() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("refA"), b"").unwrap();

        let form = SubmissionForm::from_fields(minimal_fields()).unwrap();
        let (sequences, genome) = form.check_inputs(root.path()).unwrap();
        assert_eq!(sequences, ">P1\nACGT");
        assert_eq!(genome, root.path().join("refA"));

        let mut fields = minimal_fields();
        fields.insert(FIELD_SEQUENCES.into(), "  \r\n".into());
        let form = SubmissionForm::from_fields(fields).unwrap();
        let err = form.check_inputs(root.path()).unwrap_err();
        assert!(err.to_string().contains("primers"));
    }

    #[test]
    fn test_resolve_genome_rejects_bad_references() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("refA"), b"").unwrap();

        assert!(resolve_genome(root.path(), "refA").is_ok());
        for bad in ["", "  ", "../refA", "/etc/passwd", "sub/refA", "..", "missing"] {
            let err = resolve_genome(root.path(), bad).unwrap_err();
            assert!(matches!(err, Error::Input(_)), "{:?}", bad);
        }
    }
}
