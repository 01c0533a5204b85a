#[test]
fn test_asm_max() {
    let max_asm = include_str!("Max.asm");
    let max_hack = include_str!("Max.hack");

    match hack::assemble(max_asm) {
        Ok(words) => {
            assert_eq!(hack::to_hack_text(&words).unwrap(), max_hack);
        }
        Err(err) => {
            panic!("{}", err)
        }
    }
}

#[test]
fn test_asm_error_shows_line() {
    let err = hack::assemble("@R0\nD=M\nD=D+\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("3:1"), "{message}");
    assert!(message.contains("D=D+"), "{message}");
}
