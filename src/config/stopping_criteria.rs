use std::str::FromStr;

/// When to stop resolving the premises of a failed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoppingCriteria {
    /// Resolve literals of the failure level, most recent first, until one literal of that level remains.
    ///
    /// Literals of lower levels are replaced by the decisions they rest on.
    /// So, a clause learned this way may contain a literal produced by some step, in place of the success of the step.
    FirstUIP = 0,

    /// Resolve every implied literal to the decisions it rests on, so a learned clause only mentions step outcomes.
    None,
}

impl std::fmt::Display for StoppingCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstUIP => write!(f, "FirstUIP"),
            Self::None => write!(f, "None"),
        }
    }
}

impl StoppingCriteria {
    pub const MIN: StoppingCriteria = StoppingCriteria::FirstUIP;
    pub const MAX: StoppingCriteria = StoppingCriteria::None;
}

/// Case-insensitive, with `uip` and `decisions` as shorthands.
impl FromStr for StoppingCriteria {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firstuip" | "uip" => Ok(Self::FirstUIP),
            "none" | "decisions" => Ok(Self::None),
            _ => Err(()),
        }
    }
}
