use rand::Rng;

/// How a set of equally valued actions is resolved to a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Always the first tied action, in the table's insertion order.
    #[default]
    First,
    /// A uniformly random tied action.
    Random,
}

impl TieBreak {
    pub fn pick<A, R: Rng + ?Sized>(&self, mut ties: Vec<A>, rng: &mut R) -> Option<A> {
        if ties.is_empty() {
            return None;
        }
        match self {
            TieBreak::First => Some(ties.swap_remove(0)),
            TieBreak::Random => {
                let index: usize = rng.gen_range(0..ties.len());
                Some(ties.swap_remove(index))
            }
        }
    }
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(TieBreak::First),
            "random" => Ok(TieBreak::Random),
            _ => Err(format!("unknown tie break '{}' (expected first or random)", s)),
        }
    }
}
