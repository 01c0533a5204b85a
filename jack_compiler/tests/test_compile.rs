use jack_compiler::{
    compile::{CodeGen, CompileError},
    compile_str, compile_with, parse_str, CompileConf, OutputMode,
};

const COUNTER: &str = include_str!("Counter.jack");
const COUNTER_VM: &str = include_str!("Counter.vm");
const SEVEN: &str = include_str!("Seven.jack");
const SEVEN_VM: &str = include_str!("Seven.vm");

#[test]
fn test_compile_counter() {
    assert_eq!(compile_str(COUNTER).unwrap(), COUNTER_VM);
}

#[test]
fn test_compile_seven() {
    assert_eq!(compile_str(SEVEN).unwrap(), SEVEN_VM);
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = compile_str(COUNTER).unwrap();
    for _ in 0..4 {
        assert_eq!(compile_str(COUNTER).unwrap(), first);
    }
}

#[test]
fn test_codegen_over_parsed_tree() {
    let tree = parse_str(COUNTER).unwrap();
    let mut codegen = CodeGen::new(Vec::new());
    codegen.compile(&tree).unwrap();

    // The subroutine scope of the last subroutine is still active.
    assert_eq!(codegen.symbols().index_of("next"), Some(0));
    assert_eq!(codegen.symbols().index_of("by"), Some(1));
    assert_eq!(String::from_utf8(codegen.into_inner()).unwrap(), COUNTER_VM);
}

#[test]
fn test_output_is_translatable() {
    // Every emitted line must parse as a stack machine command.
    let vm = compile_str(COUNTER).unwrap();
    let asm = hack::translate("Counter", &vm, Default::default()).unwrap();
    assert!(asm.contains("(Counter.step)"));
}

#[test]
fn test_label_counter_spans_subroutines() {
    let vm = compile_str(
        "class Main {
            function void a() { if (true) { } return; }
            function void b() { while (false) { } return; }
        }",
    )
    .unwrap();
    assert!(vm.contains("label IF_END_0\n"));
    assert!(vm.contains("label WHILE_EXP_1\n"));
    assert!(vm.contains("label WHILE_END_1\n"));
}

#[test]
fn test_lex_errors() {
    let err = compile_str("class Main { function void f() { return 32768; } }").unwrap_err();
    assert!(matches!(err, CompileError::Lex(_)), "{:?}", err);

    let source = "class Main { function void f() { do Output.printString(\"oops); } }";
    let err = compile_str(source).unwrap_err();
    assert!(matches!(err, CompileError::Lex(_)), "{:?}", err);

    let err = compile_str("class Main { } /* never closed").unwrap_err();
    assert!(matches!(err, CompileError::Lex(_)), "{:?}", err);
}

#[test]
fn test_parse_errors() {
    let err = compile_str("class Main { function void f() { return } }").unwrap_err();
    match err {
        CompileError::Parse(err) => assert_eq!(err.to_string(), "1:41: expected term, found '}'"),
        err => panic!("expected parse error, found {:?}", err),
    }

    let err = compile_str("class A { } class B { }").unwrap_err();
    match err {
        CompileError::Parse(err) => {
            assert_eq!(err.to_string(), "1:13: expected end of source, found 'class'")
        }
        err => panic!("expected parse error, found {:?}", err),
    }
}

#[test]
fn test_unknown_names_in_call_position() {
    // Class and subroutine names are not checked.
    let source = "class Main { function void f() { do Nowhere.nothing(); do missing(); return; } }";
    let vm = compile_str(source).unwrap();
    assert!(vm.contains("call Nowhere.nothing 0\n"));
    assert!(vm.contains("call Main.missing 1\n"));
}

#[test]
fn test_output_modes() {
    let conf = CompileConf {
        mode: OutputMode::Tokens,
    };
    let tokens = compile_with(SEVEN, &conf).unwrap();
    assert!(tokens.starts_with("<tokens>\n<keyword> class </keyword>\n"));
    assert!(tokens.ends_with("<symbol> } </symbol>\n</tokens>\n"));

    let conf = CompileConf { mode: OutputMode::Vm };
    assert_eq!(compile_with(SEVEN, &conf).unwrap(), SEVEN_VM);
}
