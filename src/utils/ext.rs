/// `true` for Solidity sources (`.sol`, any case).
pub fn is_solidity(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sol"))
}

#[test]
fn is_solidity_recognises_sol_files() {
  let cases = [
    ("Token.sol",      true),
    ("TOKEN.SOL",      true),
    ("contracts/a.Sol",true),
    ("Token.vy",       false),
    ("sol",            false),
    ("Token.sol.bak",  false),
  ];

  for (file, expected) in cases {
    assert_eq!(is_solidity(std::path::Path::new(file)), expected, "case: {file}");
  }
}
