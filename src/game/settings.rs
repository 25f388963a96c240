#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Wire value for the backend query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Numbers 1-10",
            Difficulty::Medium => "Numbers 1-20",
            Difficulty::Hard => "Numbers 1-50",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&d| d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&d| d == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    AdditionSubtraction,
    MultiplicationDivision,
}

impl Operation {
    pub const ALL: [Operation; 2] = [
        Operation::AdditionSubtraction,
        Operation::MultiplicationDivision,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::AdditionSubtraction => "addition_subtraction",
            Operation::MultiplicationDivision => "multiplication_division",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::AdditionSubtraction => "Add & Subtract",
            Operation::MultiplicationDivision => "Multiply & Divide",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Operation::AdditionSubtraction => Operation::MultiplicationDivision,
            Operation::MultiplicationDivision => Operation::AdditionSubtraction,
        }
    }
}

/// Settings chosen on the start screen. Immutable once a round begins;
/// "play again" reuses the last-used pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub operation: Operation,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            operation: Operation::AdditionSubtraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_cycles_through_all_values() {
        let mut d = Difficulty::Easy;
        for _ in 0..Difficulty::ALL.len() {
            d = d.next();
        }
        assert_eq!(d, Difficulty::Easy);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Hard);
    }

    #[test]
    fn wire_values_match_backend_enums() {
        assert_eq!(Difficulty::Medium.as_str(), "medium");
        assert_eq!(Operation::AdditionSubtraction.as_str(), "addition_subtraction");
        assert_eq!(
            Operation::MultiplicationDivision.as_str(),
            "multiplication_division"
        );
    }

    #[test]
    fn operation_toggle_is_involutive() {
        let op = Operation::AdditionSubtraction;
        assert_eq!(op.toggle().toggle(), op);
    }
}
