pub mod compile;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;
pub mod xml;

use compile::{CodeGen, CompileResult};
use log::debug;
use parsing::{AstVisitor, CompilationUnit, Parse};

/// What a compilation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stack machine commands.
    #[default]
    Vm,
    /// XML parse tree.
    Tree,
    /// Flat XML token listing.
    Tokens,
}

#[derive(Debug, Clone, Default)]
pub struct CompileConf {
    pub mode: OutputMode,
}

/// Parse one compilation unit into its syntax tree.
pub fn parse_str(source: &str) -> CompileResult<CompilationUnit> {
    // Lexical analysis
    let lexer = lex::Lexer::new(source);
    let mut stream = token_stream::TokenStream::new(lexer);

    // Syntactic analysis
    Ok(CompilationUnit::parse(&mut stream)?)
}

/// Compile one compilation unit to stack machine text.
pub fn compile_str(source: &str) -> CompileResult<String> {
    compile_with(source, &CompileConf::default())
}

/// Run the unit through the stages the output mode needs.
///
/// Nothing is returned on failure, so partial output never
/// reaches the caller.
pub fn compile_with(source: &str, conf: &CompileConf) -> CompileResult<String> {
    match conf.mode {
        OutputMode::Tokens => {
            let tokens = lex::tokenize(source)?;
            debug!("{} tokens", tokens.len());
            Ok(xml::write_tokens(source, &tokens)?)
        }
        OutputMode::Tree => {
            let tree = parse_str(source)?;
            let mut writer = xml::XmlWriter::new(source);
            writer.comp_unit(&tree)?;
            Ok(writer.into_inner())
        }
        OutputMode::Vm => {
            let tree = parse_str(source)?;

            // Semantic analysis and code generation
            let mut codegen = CodeGen::new(Vec::new());
            codegen.compile(&tree)?;

            // Commands are written from `str` fragments only.
            Ok(String::from_utf8_lossy(&codegen.into_inner()).into_owned())
        }
    }
}
