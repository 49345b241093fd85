//! Symbolic names and annotation strings for operand values.
//!
//! The small enums here surface in listings as bare names and must parse
//! back, so their order is the binary encoding. The longer description
//! tables only feed listing comments and never round trip.

/// Character sprite poses, in encoding order.
pub static POSES: &[&str] = &[
    "still",
    "idle",
    "walk",
    "pain",
    "fight",
    "crouched",
    "depressed",
    "victory",
    "dead",
    "collapse",
    "stand_up",
];

/// Emote bubbles shown over a character.
pub static EMOTES: &[&str] = &["exclamation", "question", "heart", "awkward", "zzz"];

/// Facing directions on the isometric grid.
pub static EVENT_DIRS: &[&str] = &["NW", "SE", "SW", "NE"];

/// Slots a portrait can be drawn in.
pub static PORTRAIT_ORIENTATION: &[&str] = &["left", "middle", "right"];

/// Transfer direction of a money operation.
pub static MONEY_DIRECTION: &[&str] = &["ADD", "REMOVE"];

/// Portrait ids, in encoding order.
pub static PORTRAIT_CHARS: &[&str] = &[
    "MC",
    "Maki",
    "Mark",
    "Nanjo",
    "Yukino",
    "Ayase",
    "Brown",
    "Elly",
    "Reiji",
    "Maki_sick",
    "Maki_happy",
    "Mai",
    "Aki",
    "Maki_masked",
    "Maki_masked_SQQ",
    "Setsuko",
    "MC_alt1",
    "Saeko",
    "Saeko_Ice",
    "Saeko_young",
    "Nurse",
    "Hanya",
    "Ooishi",
    "Yamaoka",
    "Yosuke",
    "Chisato",
    "Chisato_corruptv1",
    "Chisato_corruptv2",
    "Chisato_corruptv3",
    "MC_alt2",
    "Tsutomu",
    "Yuko",
    "Yuko_smug",
    "Toro",
    "MC_alt3",
    "Tadashi",
    "Tamaki",
    "Katsue_rich",
    "Katsue_poor",
    "Kandori",
    "Kandori_mask",
    "Takeda",
    "MC_alt4",
    "Nicholai",
    "Tomomi",
    "Tomomi_corrupt",
    "MC_alt5",
    "Kumi",
    "Michiko",
    "Yuriko",
    "MC_alt6",
    "MC_alt7",
    "Night_Queen",
    "Yin_Yang_clerk",
    "Rosa_clerk",
    "Weapon_clerk",
    "Armor_clerk",
    "Pharma_clerk",
    "MC_alt8",
    "Sweets_clerk",
    "Turunkhamen",
    "Club_coin_clerk",
    "Diner_clerk",
    "Doctor",
    "Igor",
    "Trish",
    "Khamenturun",
    "MC_alt9",
    "Master",
    "Club_yen_clurk",
    "glitch",
];

/// Position in `table` of an exact `name`, which is its encoded value.
pub fn index_of(table: &[&str], name: &str) -> Option<usize> {
    table.iter().position(|entry| *entry == name)
}

/// What each full screen effect id does.
static SCREEN_EFFECTS: &[&str] = &[
    "stop current effect (only works for earthquake)",
    "fades out of black (quick)",
    "fades out of black (mid speed)",
    "fades out of black (slow)",
    "fades into black (quick)",
    "fades into black (mid speed)",
    "fades into black (slow)",
    "smaller screen shake (earthquake)",
    "medium screen shake (earthquake)",
    "bigger screen shake (earthquake)",
    "fades out of white (quick)",
    "fades out of white (mid speed)",
    "fades out of white (slow)",
    "fades into white (quick)",
    "fades into white (mid speed)",
    "fades into white (slow)",
    "screen flashes black (mid speed)",
    "screen flashes black (quick)",
];

/// Which scripted battle each id starts.
static BATTLES: &[&str] = &[
    "first awakening",
    "Elly's awakening",
    "Maki's awakening",
    "Brown's awakening",
    "Ayase's awakening",
    "Takeda battle",
    "Reiji's awakening",
    "Reiji's awakneing variation?",
    "Tesso battle",
    "Yog Sothoth Jr battle",
    "Harem Queen battle",
    "Harem Queen variation battle ?",
    "Mr. Bear battle",
    "Saurva battle",
    "Hariti battle",
    "Kandori battle",
    "Pandora fase 1",
    "Akuma monster battle",
    "Akuma monster battle variation?",
    "Hypnos 1 battle",
    "Hypnos 2 battle",
    "Hypnos 3 battle",
    "Hypnos 4 battle",
    "Nemesis 1 battle",
    "Nemesis 2 battle",
    "Nemesis 3 battle",
    "Nemesis 4 battle",
    "Nemesis 5 battle",
    "Nemesis 6 battle",
    "Thanatos 1 battle",
    "Thanatos 2 battle",
    "Snow Queen mask battle",
    "Queen Asura battle",
    "bad ending last battle",
    "Pandora fase 2",
];

/// Choice rows each option set id presents.
static OPTIONS: &[&[&str]] = &[
    &["Yes", "No"],
    &["Sure.", "No way."],
    &["Yeah,", "No, I don't"],
    &["Start game", "Check coins", "See explanations", "Stop playing"],
    &["No", "Yes"],
    &["Game rules", "Controls", "Winning hands", "Go back"],
    &["Game rules", "Controls", "Tips", "Go back"],
    &["Let them join", "Don't let them join"],
    &["Help her", "Don't help her"],
    &["Don't leave", "Leave"],
    &["Don't open it", "Open it"],
    &["Don't listen", "Listen"],
    &["Create Persona", "Take on Persona", "Talk", "Leave"],
    &["Stop hiding.", "Yes, it's safe here.", "That's true, but...", "I don't really know."],
    &["For myself.", "Just 'cause.", "For everyone's sake.", "That's how it went."],
    &["I don't really know.", "To find my reason."],
    &["Press the red button", "Press the blue button."],
    &["Heal us, please.", "Just dropping by."],
    &["Fight Hariti", "Lower your weapons"],
    &["Don't hide like that!", "Maybe you are..."],
    &["Stay here", "Go to 8F", "Go to 4F", "Go to 1F"],
    &["Manual Fusion", "Guided Fusion", "View cards", "Cancel"],
    &["The Queen's is better.", "Maki's is better."],
    &["Beginner tips", "Regular tips", "About Personas", "Advanced tips"],
    &["Start game", "Check cards", "See explanations", "Cancel"],
    &["Bet on Mark", "Bet on Brown"],
    &["That's the plan.", "Not really."],
    &["Yeah.", "That's"],
    &["Yeah, I do.", "No, no one."],
    &["A few.", "Not a one."],
    &["I like the old way.", "I like the new way."],
    &["Sure, put me down.", "Don't you dare."],
    &["Buy", "Sell", "Equip", "Cancel"],
    &["Trade for items", "Trade for incense", "Equip", "Cancel"],
    &["Normal", "Beginner", "Expert"],
    &["Yes, it was.", "On second thought..."],
];

/// Annotation for a battle id.
pub fn battle_description(value: u16) -> &'static str {
    BATTLES.get(value as usize).copied().unwrap_or("unknown")
}

/// Annotation for a full screen effect id.
pub fn screen_effect_description(value: u16) -> &'static str {
    SCREEN_EFFECTS
        .get(value as usize)
        .copied()
        .unwrap_or("unknown")
}

/// The choice rows behind an option set id, when the id is known.
pub fn option_set(value: u16) -> Option<&'static [&'static str]> {
    OPTIONS.get(value as usize).copied()
}

/// Annotation for a shop menu id.
pub fn shop_description(value: u16) -> &'static str {
    match value {
        0x1 => "Yin & Yang, Maki's world v1",
        0x2 => "Weapon shop, Aki's side v1",
        0x3 => "Weapon shop, Aki's side v2",
        0x4 => "Yin & Yang, Maki's world v2",
        0x6 => "Rosa, Mai's side v1",
        0x7 => "Armor shop, Aki's side v1",
        0x8 => "Armor shop, Aki's side v2",
        0x9 => "Rosa, Mai's side v2",
        0xA => "Tadashi, Mai's side v1",
        0xB => "Tadashi, Aki's side v1",
        0xC => "Turunkhamen, Mai's side v1",
        0xD => "Turunkhamen, Aki's side v1",
        0xE => "Casino, money to coin",
        0xF => "Casino, coin to item, Mai's side v1",
        0x10 => "Yin & Yang real world",
        0x11 => "Sennen",
        0x12 => "Tadashi",
        0x14 => "Casino, coin to item, Sun Mall v1?",
        0x16 => "Casino, coin to item, unknown",
        0x18 => "Casino, coin to item, Sun Mall v2?",
        0x1A => "Casino, coin to item, Joy Street",
        0x1C => "Casino, coin to item, Mai's side v2",
        0x1E => "Casino, coin to item, Aki's side v1",
        0x1F => "Khamenturun, Mai's side v1",
        0x20 => "Velvet Room, talk menu",
        0x21 => "Velvet Room, manual fusion menu",
        0x22 => "Velvet Room, guided fusion menu",
        0x23 => "Velvet Room, view cards menu",
        0x24 => "Velvet Room, leave?!??!!",
        0x25 => "Casino, poker help menu",
        0x26 => "Casino, blackjack help menu",
        0x27 => "Casino, slot machine help menu",
        0x28 => "Casino, code breaker help menu",
        0x29 => "Casino, dice game help menu",
        0x31 => "Tadashi, Mai's side v2",
        0x32 => "Turunkhamen, Mai's side v2",
        _ => "unknown",
    }
}

/// Annotation for a sound effect id.
pub fn sfx_description(value: u16) -> &'static str {
    match value {
        0x0 | 0x1 => "woosh",
        0x3 => "quick lightning",
        0x4 => "heal/reflect sound?",
        0x5 => "holy voice",
        0x8 => "something fell, a rock or smt",
        0x9 => "something falling intensely? Sounds kinda like lightning",
        0xA => "little noises followed by weird woosh",
        0xB => "water flowing, a lil bubbling",
        0xC | 0xD => "bird, followed by pecking",
        0xE => "open door",
        0xF => "unlock door",
        0x10 => "open gate",
        0x11 => "creaking",
        0x12 => "some other opening sound, gate or something? Resident Evil like",
        0x13 => "deep lightning, or something falling",
        0x14 => "same as before but more intense, metallic scrapping as well",
        0x15 => "quick opening of metal door",
        0x16 => "weird woosh",
        0x17 => "quick woosh",
        0x18 => "machine hum",
        0x19 => "heavy machine (moving?)",
        0x1A => "quiet unlock",
        0x1B => "ominous sound, like a debuff being cast (imagination)",
        0x1C => "page turn?",
        0x1D => "curtain pull?",
        0x1E => "glass shatter",
        0x1F => "ray gun",
        0x20 => "lightning_1",
        0x21 => "small crunch",
        0x22 => "ghostly sound, deep",
        0x23 => "mechanical door closing? or elevator stopping",
        0x24 => "BAM (closed window quickly)",
        0x25 => "light woosh, like page turning",
        0x26 => "open heavier door",
        0x27 => "heartbeat",
        0x28 => "punch",
        0x29 => "small ding",
        0x2A => "window break",
        0x2B => "minecraft cave noise",
        0x2C => "Ice Queen music box",
        0x2D => "teleporter sound",
        0x2E => "healing like holy sound, revive vibes",
        0x2F => "weird woosh, comes and goes",
        0x30 => "electronic woosh",
        0x31 => "deep sounding lightning?",
        0x32 => "big metal gate quick open",
        0x4D => "lightning_2",
        _ => "nothing",
    }
}
