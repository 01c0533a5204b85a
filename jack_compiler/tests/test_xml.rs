use jack_compiler::{compile_with, CompileConf, OutputMode};

const MAIN: &str = include_str!("Main.jack");
const MAIN_XML: &str = include_str!("Main.xml");

#[test]
fn test_parse_tree() {
    let conf = CompileConf { mode: OutputMode::Tree };
    assert_eq!(compile_with(MAIN, &conf).unwrap(), MAIN_XML);
}

#[test]
fn test_tree_keeps_every_token() {
    let tokens = compile_with(MAIN, &CompileConf { mode: OutputMode::Tokens }).unwrap();
    let tree = compile_with(MAIN, &CompileConf { mode: OutputMode::Tree }).unwrap();

    let terminals = |text: &str| {
        text.lines()
            .map(str::trim)
            .filter(|line| line.contains("> ") && line.contains(" </"))
            .map(str::to_owned)
            .collect::<Vec<_>>()
    };
    assert_eq!(terminals(&tokens), terminals(&tree));
}
