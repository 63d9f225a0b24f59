use crate::errors::MatcherFailure;
use crate::utils::regex_cache;
use once_cell::sync::OnceCell;
use std::ops::Range;

/// Declarations that open a function-like scope.
const SCOPE_SIGNATURE: &str =
    r"\b(?:function\s+\w+|constructor|modifier\s+\w+|fallback|receive)\s*\(";

const CONTRACT_DECL: &str =
    r"\b(?:contract|library|interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)";

/// A brace-delimited block located from a declaration.
///
/// All offsets are byte offsets into [`SourceUnit::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Start of the declaration that introduced the block.
    pub start: usize,
    /// Offset of the opening `{`.
    pub open: usize,
    /// One past the matching `}`.
    pub end: usize,
}

impl Block {
    /// Declaration text, up to (not including) the opening brace.
    pub fn signature(&self) -> Range<usize> {
        self.start..self.open
    }

    /// Declaration plus body, closing brace included.
    pub fn whole(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Function, constructor, modifier, fallback or receive body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub start_line: usize,
    pub end_line: usize,
    pub signature: Range<usize>,
}

/// One normalized Solidity source unit.
///
/// Line endings are folded to `\n`, trailing whitespace is stripped from
/// every line and trailing blank lines are dropped. Every offset and line
/// number handed out refers to this normalized text.
///
/// Matching runs on [`SourceUnit::code`], a copy of the text with comments
/// and string contents blanked out byte for byte, so the same offsets and
/// line numbers address both views.
#[derive(Debug)]
pub struct SourceUnit {
    text: String,
    code: String,
    line_starts: Vec<usize>,
    scopes: OnceCell<Result<Vec<Scope>, MatcherFailure>>,
}

impl SourceUnit {
    pub fn new(raw: &str) -> Self {
        let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
        let mut text = unified
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
        text.truncate(text.trim_end_matches('\n').len());

        let line_starts = if text.is_empty() {
            Vec::new()
        } else {
            std::iter::once(0)
                .chain(text.match_indices('\n').map(|(i, _)| i + 1))
                .collect()
        };

        let code = mask_code(&text);

        Self {
            text,
            code,
            line_starts,
            scopes: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, range: Range<usize>) -> &str {
        &self.text[range]
    }

    /// The text with comments and string contents replaced by spaces.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn code_slice(&self, range: Range<usize>) -> &str {
        &self.code[range]
    }

    /// `true` when the unit holds no characters besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// `(line_number, line)` pairs, 1-based.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.text.split('\n').take(self.line_count()).enumerate().map(|(i, l)| (i + 1, l))
    }

    /// Text of the 1-based line `number`.
    pub fn line(&self, number: usize) -> Option<&str> {
        self.line_range(number).map(|r| &self.text[r])
    }

    /// Masked counterpart of [`SourceUnit::line`].
    pub fn code_line(&self, number: usize) -> Option<&str> {
        self.line_range(number).map(|r| &self.code[r])
    }

    fn line_range(&self, number: usize) -> Option<Range<usize>> {
        let start = *self.line_starts.get(number.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(number)
            .map_or(self.text.len(), |next| next - 1);
        Some(start..end)
    }

    /// 1-based line holding byte `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx.max(1),
        }
    }

    /// blake3 digest of the normalized text, lower-case hex.
    pub fn hash(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }

    /// Name of the first contract, library or interface declared.
    pub fn contract_name(&self) -> Option<String> {
        let re = regex_cache::get(CONTRACT_DECL).ok()?;
        re.captures(&self.code)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    }

    /// Find the block introduced by the declaration starting at `start`.
    ///
    /// Braces are counted on the masked code, so those inside comments and
    /// string literals never count. A `;` outside parentheses before any `{`
    /// means the declaration has no body, as does a `}` that closes an
    /// enclosing block first; both yield `Ok(None)`. Reaching the end of the
    /// text inside the block is an [`MatcherFailure::UnterminatedBlock`].
    pub fn block_at(&self, start: usize) -> Result<Option<Block>, MatcherFailure> {
        let mut parens = 0usize;
        let mut depth = 0usize;
        let mut open = None;

        for (i, byte) in self.code.bytes().enumerate().skip(start) {
            match byte {
                b'(' if open.is_none() => parens += 1,
                b')' if open.is_none() => parens = parens.saturating_sub(1),
                b';' if open.is_none() && parens == 0 => return Ok(None),
                b'{' => {
                    open.get_or_insert(i);
                    depth += 1;
                }
                b'}' => {
                    let Some(open) = open else {
                        return Ok(None);
                    };
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Some(Block {
                            start,
                            open,
                            end: i + 1,
                        }));
                    }
                }
                _ => {}
            }
        }

        match open {
            Some(open) => Err(MatcherFailure::UnterminatedBlock {
                line: self.line_of(open),
            }),
            None => Ok(None),
        }
    }

    /// Every function-like scope with a body, in source order.
    ///
    /// Computed on first use and shared by all patterns scanning this unit.
    pub fn scopes(&self) -> Result<&[Scope], MatcherFailure> {
        self.scopes
            .get_or_init(|| self.collect_scopes())
            .as_ref()
            .map(Vec::as_slice)
            .map_err(MatcherFailure::clone)
    }

    /// Innermost scope containing `line`.
    pub fn enclosing_scope(&self, line: usize) -> Result<Option<&Scope>, MatcherFailure> {
        Ok(self
            .scopes()?
            .iter()
            .filter(|s| s.start_line <= line && line <= s.end_line)
            .max_by_key(|s| s.start_line))
    }

    fn collect_scopes(&self) -> Result<Vec<Scope>, MatcherFailure> {
        let re = regex_cache::get(SCOPE_SIGNATURE)?;
        let mut scopes = Vec::new();
        for m in re.find_iter(&self.code) {
            if let Some(block) = self.block_at(m.start())? {
                scopes.push(Scope {
                    start_line: self.line_of(block.start),
                    end_line: self.line_of(block.end - 1),
                    signature: block.signature(),
                });
            }
        }
        tracing::debug!("{} scopes located", scopes.len());
        Ok(scopes)
    }
}

#[derive(Clone, Copy)]
enum Lexeme {
    Code,
    LineComment,
    BlockComment,
    Str(char),
}

/// Blank out comments and string contents, keeping byte offsets and `\n`.
///
/// Quote characters stay in place so `"..."` still reads as a literal. A
/// string that runs into a newline ends there.
fn mask_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = Lexeme::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            Lexeme::Code => match c {
                '/' if chars.next_if_eq(&'/').is_some() => {
                    out.push_str("  ");
                    Lexeme::LineComment
                }
                '/' if chars.next_if_eq(&'*').is_some() => {
                    out.push_str("  ");
                    Lexeme::BlockComment
                }
                '"' | '\'' => {
                    out.push(c);
                    Lexeme::Str(c)
                }
                _ => {
                    out.push(c);
                    Lexeme::Code
                }
            },
            Lexeme::LineComment if c == '\n' => {
                out.push('\n');
                Lexeme::Code
            }
            Lexeme::BlockComment if c == '*' && chars.next_if_eq(&'/').is_some() => {
                out.push_str("  ");
                Lexeme::Code
            }
            Lexeme::Str(quote) if c == quote => {
                out.push(c);
                Lexeme::Code
            }
            Lexeme::Str(_) if c == '\n' => {
                out.push('\n');
                Lexeme::Code
            }
            Lexeme::Str(quote) if c == '\\' => {
                blank(&mut out, c);
                if let Some(escaped) = chars.next_if(|n| *n != '\n') {
                    blank(&mut out, escaped);
                }
                Lexeme::Str(quote)
            }
            other => {
                blank(&mut out, c);
                other
            }
        };
    }
    out
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

#[test]
fn normalizes_line_endings_and_trailing_whitespace() {
    let unit = SourceUnit::new("a  \r\nb\t\rc\n\n   \n");
    assert_eq!(unit.text(), "a\nb\nc");
    assert_eq!(unit.line_count(), 3);
    let lines: Vec<_> = unit.lines().collect();
    assert_eq!(lines, [(1, "a"), (2, "b"), (3, "c")]);
    assert_eq!(unit.line(2), Some("b"));
    assert_eq!(unit.line(0), None);
    assert_eq!(unit.line(4), None);
}

#[test]
fn whitespace_only_source_has_no_lines() {
    let unit = SourceUnit::new(" \n\t\r\n  ");
    assert!(unit.is_blank());
    assert_eq!(unit.line_count(), 0);
    assert_eq!(unit.lines().count(), 0);
}

#[test]
fn line_of_maps_offsets() {
    let unit = SourceUnit::new("ab\ncd\nef");
    assert_eq!(unit.line_of(0), 1);
    assert_eq!(unit.line_of(2), 1);
    assert_eq!(unit.line_of(3), 2);
    assert_eq!(unit.line_of(7), 3);
}

#[test]
fn block_skips_braces_in_strings_and_comments() {
    let src = "function f() public {\n  string s = \"}\";\n  // }\n  /* { */\n  if (x) { y(); }\n}\nuint after;";
    let unit = SourceUnit::new(src);
    let block = unit.block_at(0).unwrap().expect("body");
    assert_eq!(unit.line_of(block.end - 1), 6);
    assert_eq!(unit.slice(block.signature()), "function f() public ");
    assert!(unit.slice(block.whole()).ends_with("y(); }\n}"));
}

#[test]
fn bodiless_declarations_have_no_block() {
    let unit = SourceUnit::new("function f() external;\nfunction g() public { }");
    assert_eq!(unit.block_at(0).unwrap(), None);

    let unit = SourceUnit::new("contract C { for (uint i; i < n; i++) x++; }");
    let at = unit.text().find("for").unwrap();
    assert_eq!(unit.block_at(at).unwrap(), None);
}

#[test]
fn unterminated_block_reports_opening_line() {
    let unit = SourceUnit::new("contract C {\nfunction f() public {\n  x = 1;\n");
    let at = unit.text().find("function").unwrap();
    assert_eq!(
        unit.block_at(at),
        Err(MatcherFailure::UnterminatedBlock { line: 2 })
    );
}

#[test]
fn scopes_and_enclosing_lookup() {
    let src = "contract T {\n  constructor() {\n    a = 1;\n  }\n  function mint(address to) external {\n    b = 2;\n  }\n  uint c = 3;\n}";
    let unit = SourceUnit::new(src);
    let scopes = unit.scopes().unwrap();
    assert_eq!(scopes.len(), 2);
    assert_eq!((scopes[0].start_line, scopes[0].end_line), (2, 4));
    assert_eq!((scopes[1].start_line, scopes[1].end_line), (5, 7));

    let inner = unit.enclosing_scope(6).unwrap().unwrap();
    assert!(unit.slice(inner.signature.clone()).starts_with("function mint"));
    assert!(unit.enclosing_scope(8).unwrap().is_none());
}

#[test]
fn contract_name_and_hash() {
    let a = SourceUnit::new("pragma solidity ^0.8.0;\ncontract Token is ERC20 {}\n");
    let b = SourceUnit::new("pragma solidity ^0.8.0;\r\ncontract Token is ERC20 {}   ");
    assert_eq!(a.contract_name().as_deref(), Some("Token"));
    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.hash().len(), 64);
    assert_eq!(SourceUnit::new("uint x;").contract_name(), None);
}

#[test]
fn masked_code_keeps_offsets_and_lines() {
    let src = "uint a; // é {\nstring s = \"{}\"; /* y\nz */ b();\nchar c = '\\'';";
    let unit = SourceUnit::new(src);
    assert_eq!(unit.code().len(), unit.text().len());
    assert!(!unit.code().contains('{'));
    assert_eq!(unit.code_line(1).map(str::trim_end), Some("uint a;"));
    assert_eq!(unit.code_line(2).map(str::trim_end), Some("string s = \"  \";"));
    assert_eq!(unit.code_line(3), Some("     b();"));
    assert_eq!(unit.code_line(4), Some("char c = '  ';"));
    assert_eq!(unit.line(3), Some("z */ b();"));
}

#[test]
fn declarations_in_comments_and_strings_are_not_scopes() {
    let src = "/// Usage: function mint(address to) external {\ncontract T {\n  string doc = \"function g() public {\";\n  /* function h() public { */\n  function f() public {\n    x = 1;\n  }\n}";
    let unit = SourceUnit::new(src);
    let scopes = unit.scopes().unwrap();
    assert_eq!(scopes.len(), 1);
    assert_eq!((scopes[0].start_line, scopes[0].end_line), (5, 7));
    assert_eq!(unit.contract_name().as_deref(), Some("T"));
}
