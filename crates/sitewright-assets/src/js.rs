//! JavaScript bundling and minification.
//!
//! Uses oxc for minification. Bundles are plain concatenations of classic
//! scripts, so sources are parsed as scripts (not modules) and top-level
//! names are left alone.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::error::AssetError;

/// Concatenate script sources in order.
///
/// Each source is terminated with `;` and a newline so a file without a
/// trailing semicolon cannot fuse with the next one.
pub fn concat_scripts<'a, I>(sources: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut bundle = String::new();
    for source in sources {
        let trimmed = source.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        bundle.push_str(trimmed);
        if !trimmed.ends_with(';') {
            bundle.push(';');
        }
        bundle.push('\n');
    }
    bundle
}

/// Minify JavaScript source code.
///
/// Top-level declarations are globals shared with other bundles and inline
/// page scripts; they are neither renamed nor dropped when unused.
pub fn minify_js(source: &str) -> Result<String, AssetError> {
    let allocator = Allocator::default();
    let source_type = SourceType::script();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let messages = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AssetError::JsParse(messages));
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;

    Ok(code)
}
