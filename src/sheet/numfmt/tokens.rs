//! Number format tokens

/// Comparison operator of a `[>=100]` style condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl ConditionOp {
    /// Whether `value <op> operand` holds
    #[inline]
    pub fn matches(self, value: f64, operand: f64) -> bool {
        match self {
            ConditionOp::Lt => value < operand,
            ConditionOp::Le => value <= operand,
            ConditionOp::Gt => value > operand,
            ConditionOp::Ge => value >= operand,
            ConditionOp::Eq => value == operand,
            ConditionOp::Ne => value != operand,
        }
    }
}

/// One lexical element of a format section.
///
/// Placeholder runs keep their length, so `"000"` is a single
/// `DigitZero(3)`. Date and time tokens keep the text as written and are
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatToken {
    /// Text copied to the output: quoted strings, escapes and plain characters
    Literal(String),
    /// `0`: digit or zero
    DigitZero(usize),
    /// `#`: digit or nothing
    DigitHash(usize),
    /// `?`: digit or space
    DigitQuestion(usize),
    DecimalPoint,
    /// `,`: grouping, or scaling by 1000 after the last placeholder
    ThousandsSep,
    Percent,
    /// `yyyy`, `mm`, `d`, `h`, `ss`, `AM/PM`, `e`, `g`, `b1`...
    DateTime(String),
    /// `[h]`, `[mm]`, `[ss]`
    ElapsedDateTime(String),
    /// `/` between numerator and denominator placeholders
    Fraction,
    /// Fixed denominator written as digits after `/`
    Denominator(u32),
    /// `E+`, `E-`, `e+`, `e-`
    Exponential(String),
    Condition(ConditionOp, f64),
    Color,
    /// `[$sym-lcid]`; only the symbol is rendered
    CurrencyLanguage(String),
    /// `_x`: a space as wide as `x`
    Alignment(char),
    /// `*x`: fill character, rendered once
    RepeatChar(char),
    /// `@`
    TextPlaceholder,
    /// `General` keyword inside a section
    General,
}

impl FormatToken {
    /// Whether this is a `0`, `#` or `?` run
    #[inline]
    pub fn is_digit_placeholder(&self) -> bool {
        matches!(
            self,
            FormatToken::DigitZero(_) | FormatToken::DigitHash(_) | FormatToken::DigitQuestion(_)
        )
    }

    /// Placeholder character and run length
    #[inline]
    pub fn placeholder(&self) -> Option<(char, usize)> {
        match *self {
            FormatToken::DigitZero(n) => Some(('0', n)),
            FormatToken::DigitHash(n) => Some(('#', n)),
            FormatToken::DigitQuestion(n) => Some(('?', n)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::DateTime(_) | FormatToken::ElapsedDateTime(_)
        )
    }

    /// Decorations that only carry text into the output
    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, FormatToken::Literal(_))
    }
}
