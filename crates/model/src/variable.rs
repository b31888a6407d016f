//! Model variables and their timing partition.

/// Whether a variable is fixed by the past or free to jump at `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// State variable: may appear at `t-1` and `t`, never at `t+1`.
    Predetermined,
    /// Control variable: may appear at `t` and `t+1`, never at `t-1`.
    Jump,
}

impl VariableKind {
    /// Lower-case label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            VariableKind::Predetermined => "predetermined",
            VariableKind::Jump => "jump",
        }
    }
}

/// A named endogenous variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    kind: VariableKind,
}

impl Variable {
    /// A predetermined (state) variable.
    pub fn predetermined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Predetermined,
        }
    }

    /// A jump (control) variable.
    pub fn jump(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Jump,
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timing partition.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Shorthand for `kind() == Predetermined`.
    pub fn is_predetermined(&self) -> bool {
        self.kind == VariableKind::Predetermined
    }
}
