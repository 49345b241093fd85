use super::parser::Token;

use lexgen::lexer;

fn parse_dec(digits: &str) -> i64 {
    i64::from_str_radix(digits, 10).unwrap()
}

fn parse_hex(digits: &str) -> u32 {
    u32::from_str_radix(digits, 16).unwrap()
}

/// The words of an `unknown|xxxxxxxx,xxxxxxxx` blob, in raw byte
/// order.
fn parse_blob(words: &str) -> Vec<u32> {
    words.split(',').map(|word| parse_hex(word)).collect()
}

#[derive(Debug, Default)]
pub struct LexerState {
    /// buffer for building string literals
    string_buf: String,
}

lexer! {
    pub Lexer(LexerState) -> Token;

    let dec_digit = ['0'-'9'];
    let hex_digit = $dec_digit | ['a'-'f' 'A'-'F'];
    let hex_word = $hex_digit $hex_digit $hex_digit $hex_digit
                   $hex_digit $hex_digit $hex_digit $hex_digit;

    rule Init {
        /* spaces and tabs only separate fields; line ends matter */
        [' ' '\t']+,

        /* comments run to the end of the line, the line end stays */
        "//" (_ # '\n')*,

        "\r\n" = Token::Break,
        "\n" = Token::Break,

        /* keywords */
        "addr"    = Token::KwAddr,
        "section" = Token::KwSection,
        "EMPTY"   = Token::KwEmpty,

        /* section names */
        ".bgm"           = Token::SecBgm,
        ".talk"          = Token::SecTalk,
        ".talk2"         = Token::SecTalk2,
        ".positions"     = Token::SecPositions,
        ".interactables" = Token::SecInteractables,
        ".code"          = Token::SecCode,
        ".text"          = Token::SecText,

        /* punctuation */
        "," = Token::Comma,
        ":" = Token::Colon,

        /* compound operands */

        "MV" $hex_digit $hex_digit ".pmf" => |lexer| {
            let m = lexer.match_();
            lexer.return_(Token::Movie(parse_hex(&m[2..4]) as u8))
        },

        "unknown|" $hex_word ("," $hex_word)* => |lexer| {
            let m = lexer.match_();
            lexer.return_(Token::Blob(parse_blob(&m["unknown|".len()..])))
        },

        /* names */

        let name_head = ['a'-'z' 'A'-'Z' '_'];
        let name_tail = $name_head | $dec_digit;

        $name_head $name_tail * => |lexer| lexer.return_(Token::Name(String::from(lexer.match_()))),

        /* integer literals */

        '-'? $dec_digit + => |lexer| lexer.return_(Token::Int(parse_dec(lexer.match_()))),
        "0x" $hex_digit + => |lexer| lexer.return_(Token::Hex(parse_hex(&lexer.match_()[2..]))),

        /* string literals */

        '"' => |lexer| {
            lexer.switch(LexerRule::String)
        },
    }

    rule String {
        '"' => |lexer| {
            use std::mem;
            let content = mem::take(&mut lexer.state().string_buf);
            lexer.switch_and_return(LexerRule::Init, Token::Str(content))
        },

        (_ # '\n') => |lexer| {
            let c = lexer.match_().chars().next_back().unwrap();
            lexer.state().string_buf.push(c);
            lexer.continue_()
        },
    }
}
