//! Citation data model.
//!
//! A recognizer turns document text into a sequence of [`CitationMatch`]
//! values. Only case citations (full and short forms) make it into a Table
//! of Authorities; [`CitationMatch::into_case`] is where everything else is
//! dropped.

/// A full case citation, e.g. `Smith v. Jones, 123 F.3d 456, 460 (9th Cir. 1999)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullCitation {
    /// Party name before the `v.` (e.g., "Smith")
    pub plaintiff: Option<String>,
    /// Party name after the `v.` (e.g., "Jones")
    pub defendant: Option<String>,
    /// Optional pin cite (e.g., "460" or "460-62")
    pub pin_cite: Option<String>,
    /// Decision year from the trailing parenthetical
    pub year: Option<String>,
    /// Court abbreviation from the trailing parenthetical (e.g., "9th Cir.")
    pub court: Option<String>,
    /// The reporter citation as it appears in the text: `<volume> <reporter> <page>`
    pub matched_text: String,
    /// Start and end byte positions of the matched text in the source
    pub span: (usize, usize),
}

/// A short-form case citation, e.g. `123 F.3d at 460`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortCitation {
    /// Optional pin cite following `at`
    pub pin_cite: Option<String>,
    /// The anchor of the short form: `<volume> <reporter>`
    pub matched_text: String,
    /// Start and end byte positions of the whole short form in the source
    pub span: (usize, usize),
}

/// An `Id.` citation referring to the immediately preceding authority.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdCitation {
    pub pin_cite: Option<String>,
    pub matched_text: String,
    pub span: (usize, usize),
}

/// A statutory or regulatory citation, e.g. `42 U.S.C. § 1983`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LawCitation {
    /// Code title number (e.g., "42")
    pub title: String,
    /// Code abbreviation (e.g., "U.S.C.")
    pub code: String,
    /// Section identifier (e.g., "1983")
    pub section: String,
    pub matched_text: String,
    pub span: (usize, usize),
}

/// A `supra` reference, e.g. `Smith, supra, at 460`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupraCitation {
    /// The word preceding `supra` that names the earlier authority
    pub antecedent: String,
    pub pin_cite: Option<String>,
    pub matched_text: String,
    pub span: (usize, usize),
}

/// Every kind of citation a recognizer can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationMatch {
    Full(FullCitation),
    Short(ShortCitation),
    Id(IdCitation),
    Law(LawCitation),
    Supra(SupraCitation),
}

/// The subset of citations that belongs in a Table of Authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseCitation {
    Full(FullCitation),
    Short(ShortCitation),
}

impl CitationMatch {
    /// Keeps case citations and drops every other kind.
    pub fn into_case(self) -> Option<CaseCitation> {
        match self {
            CitationMatch::Full(full) => Some(CaseCitation::Full(full)),
            CitationMatch::Short(short) => Some(CaseCitation::Short(short)),
            CitationMatch::Id(_) | CitationMatch::Law(_) | CitationMatch::Supra(_) => None,
        }
    }

    /// Byte span of the match in the source text.
    pub fn span(&self) -> (usize, usize) {
        match self {
            CitationMatch::Full(c) => c.span,
            CitationMatch::Short(c) => c.span,
            CitationMatch::Id(c) => c.span,
            CitationMatch::Law(c) => c.span,
            CitationMatch::Supra(c) => c.span,
        }
    }

    /// Short lowercase name of the variant, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            CitationMatch::Full(_) => "full",
            CitationMatch::Short(_) => "short",
            CitationMatch::Id(_) => "id",
            CitationMatch::Law(_) => "law",
            CitationMatch::Supra(_) => "supra",
        }
    }
}

impl CaseCitation {
    pub fn matched_text(&self) -> &str {
        match self {
            CaseCitation::Full(c) => &c.matched_text,
            CaseCitation::Short(c) => &c.matched_text,
        }
    }
}
