//! Delimited list.
use super::ParseError;
use crate::{
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

/// Comma separated list. The commas are kept for the
/// concrete tree.
#[derive(Debug)]
pub struct Delimited<T> {
    pub items: Vec<DelimitedItem<T>>,
}

#[derive(Debug)]
pub struct DelimitedItem<T> {
    pub item: T,
    /// Comma following the item, absent on the last one.
    pub delim: Option<Token>,
}

impl<T> Delimited<T> {
    pub fn empty() -> Self {
        Self { items: vec![] }
    }

    /// Parse one or more items separated by commas.
    pub fn parse_with<F>(input: &mut TokenStream, mut parse_item: F) -> Result<Self, ParseError>
    where
        F: FnMut(&mut TokenStream) -> Result<T, ParseError>,
    {
        let mut items = vec![];

        loop {
            let item = parse_item(input)?;
            let delim = input.match_token(TokenKind::Comma)?;
            let more = delim.is_some();
            items.push(DelimitedItem { item, delim });

            if !more {
                break;
            }
        }

        Ok(Delimited { items })
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
