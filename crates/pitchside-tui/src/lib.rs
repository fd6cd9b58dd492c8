// Terminal front end for the pitchside player browser.

pub mod tui;
