use crate::encoder::{ListingError, ParseContext};

pub fn parse_listing(listing: &str) -> Result<ParseContext, ListingError> {
    use lexgen_util::LexerErrorKind;

    use crate::encoder::Lexer;
    use crate::encoder::Parser;

    // Hand-edited listings tend to lose the final line end, and every
    // row of the grammar wants one.
    let terminated;
    let listing = if listing.ends_with('\n') {
        listing
    } else {
        terminated = format!("{listing}\n");
        &terminated
    };

    let l = Lexer::new(listing);
    let mut p = Parser::new(ParseContext::new());

    for tok in l {
        match tok {
            Ok((_, tok, _)) => match p.parse(tok) {
                Ok(()) => {}
                Err(err) => return Err(err),
            },

            Err(err) => match err.kind {
                LexerErrorKind::InvalidToken => return Err(ListingError::LexError(err.location)),
                LexerErrorKind::Custom(_) => unimplemented!(),
            },
        }
    }

    match p.end_of_input() {
        Ok((_, parse_ctx)) => Ok(parse_ctx),
        Err(err) => Err(err),
    }
}
