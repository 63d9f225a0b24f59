use console::style;
use tripwire::errors::TripwireResult;
use tripwire::patterns::{Category, Pattern, Registry};

pub fn handle(registry: &Registry, category: Option<Category>, verbose: bool) -> TripwireResult<()> {
    print!("{}", render(registry, category, verbose));
    Ok(())
}

pub(crate) fn render(registry: &Registry, category: Option<Category>, verbose: bool) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{}", style("Built-in patterns").blue().bold().underlined());

    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => registry.categories().collect(),
    };
    for category in categories {
        let patterns = registry.by_category(category);
        if patterns.is_empty() {
            let _ = writeln!(out, "  {}", style(format!("∅ No patterns in {category}")).dim());
            continue;
        }
        let _ = writeln!(
            out,
            "  {} {}",
            style(category).white().bold(),
            style(format!("({})", patterns.len())).dim()
        );
        for pattern in patterns {
            render_pattern(&mut out, pattern, verbose);
        }
    }
    out
}

fn render_pattern(out: &mut String, pattern: &Pattern, verbose: bool) {
    use std::fmt::Write as _;

    let _ = writeln!(
        out,
        "    {:32} {:8} {}",
        style(pattern.id).bold(),
        pattern.severity.as_str(),
        pattern.name
    );
    if verbose {
        let _ = writeln!(out, "      {:16} {}", style("Description"), pattern.description);
        let _ = writeln!(out, "      {:16} {}", style("Recommendation"), pattern.recommendation);
    }
}

#[test]
fn lists_every_pattern_once() {
    console::set_colors_enabled(false);
    let registry = Registry::builtin().unwrap();
    let text = render(&registry, None, false);
    for pattern in registry.all() {
        assert_eq!(
            text.matches(&format!(" {} ", pattern.id)).count(),
            1,
            "{} listed more or less than once",
            pattern.id
        );
    }
    assert!(!text.contains("Recommendation"));
}

#[test]
fn filters_by_category_and_shows_details() {
    console::set_colors_enabled(false);
    let registry = Registry::builtin().unwrap();
    let text = render(&registry, Some(Category::Fee), true);
    assert!(text.contains("extreme-fee"));
    assert!(!text.contains("unlimited-minting"));
    assert!(text.contains("Recommendation"));
}
