use super::error::EngineParamError;
use crate::params::ParamStore;
use tracing::debug;

pub const KEY_CASE_NO: &str = "CaseNo";
pub const KEY_MAX_LEVEL: &str = "MAXlevel";
pub const KEY_OH: &str = "Oh";
pub const KEY_OHA: &str = "Oha";
pub const KEY_DE: &str = "De";
pub const KEY_EC: &str = "Ec";
pub const KEY_TMAX: &str = "tmax";
pub const KEY_DTMAX: &str = "dtmax";

/// Smallest accepted case number; keeps `simulationCases/<CaseNo>` lexicographically sortable.
pub const CASE_NO_FLOOR: i32 = 1000;

const DEFAULT_MAX_LEVEL: i32 = 12;
const DEFAULT_OH: f64 = 1e-2;
const DEFAULT_DE: f64 = 1e30;
const DEFAULT_EC: f64 = 1.0;
const DEFAULT_TMAX: f64 = 200.0;
const DEFAULT_DTMAX: f64 = 1e-5;
const OHA_TO_OH_RATIO: f64 = 1e-2;

/// Runtime parameters of the pinch-off engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParameters {
    pub case_no: i32,
    /// Maximum refinement level of the adaptive grid.
    pub max_level: i32,
    /// Solvent Ohnesorge number.
    pub oh: f64,
    /// Ohnesorge number of the surrounding gas.
    pub oha: f64,
    /// Deborah number.
    pub de: f64,
    /// Elasto-capillary number.
    pub ec: f64,
    pub tmax: f64,
    pub dtmax: f64,
}

impl EngineParameters {
    /// Reads and validates the reserved keys.
    ///
    /// Malformed values have already degraded to their defaults (with a warning) by the
    /// time validation runs, so a typo in an optional key never fails here; only values
    /// that are well-formed but physically meaningless do.
    pub fn from_store(store: &mut ParamStore) -> Result<Self, EngineParamError> {
        if store.get(KEY_CASE_NO).is_none() {
            return Err(EngineParamError::MissingParameter(KEY_CASE_NO));
        }
        let case_no = store.param_int(KEY_CASE_NO, -1);
        let max_level = store.param_int(KEY_MAX_LEVEL, DEFAULT_MAX_LEVEL);
        let oh = store.param_double(KEY_OH, DEFAULT_OH);
        let oha = store.param_double(KEY_OHA, OHA_TO_OH_RATIO * oh);
        let de = store.param_double(KEY_DE, DEFAULT_DE);
        let ec = store.param_double(KEY_EC, DEFAULT_EC);
        let tmax = store.param_double(KEY_TMAX, DEFAULT_TMAX);
        let dtmax = store.param_double(KEY_DTMAX, DEFAULT_DTMAX);

        let params = Self {
            case_no,
            max_level,
            oh,
            oha,
            de,
            ec,
            tmax,
            dtmax,
        };
        params.validate()?;
        debug!("Engine parameters resolved: {:?}", params);
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), EngineParamError> {
        if self.case_no < CASE_NO_FLOOR {
            return Err(EngineParamError::CaseNoBelowFloor {
                value: self.case_no,
                floor: CASE_NO_FLOOR,
            });
        }
        if self.max_level < 1 {
            return Err(EngineParamError::OutOfRange {
                key: KEY_MAX_LEVEL,
                constraint: "at least 1",
                value: f64::from(self.max_level),
            });
        }
        positive(KEY_OH, self.oh)?;
        positive(KEY_OHA, self.oha)?;
        non_negative(KEY_DE, self.de)?;
        non_negative(KEY_EC, self.ec)?;
        positive(KEY_TMAX, self.tmax)?;
        if !(self.dtmax > 0.0 && self.dtmax <= self.tmax) {
            return Err(EngineParamError::InvalidTimeStep {
                dtmax: self.dtmax,
                tmax: self.tmax,
            });
        }
        Ok(())
    }

    /// Header line the engine writes at the top of its log.
    pub fn summary_line(&self) -> String {
        format!(
            "Level {}, De {:?}, Ec {:?}, Oh {:?}, Oha {:?}",
            self.max_level, self.de, self.ec, self.oh, self.oha
        )
    }
}

fn positive(key: &'static str, value: f64) -> Result<(), EngineParamError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(EngineParamError::OutOfRange {
            key,
            constraint: "positive",
            value,
        })
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<(), EngineParamError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(EngineParamError::OutOfRange {
            key,
            constraint: "non-negative",
            value,
        })
    }
}
