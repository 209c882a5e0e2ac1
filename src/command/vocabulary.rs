//! Canonical command tags and the spoken phrases that name them.

/// Every command the kiosk understands, independent of how it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    Pause,
    Resume,
    Faster,
    Slower,
    Next,
    Previous,
    SaveFavorite,
    PlayFavorites,
    PlayAll,
    DeleteCurrent,
    Restart,
    /// Parametric: needs an image number.
    GoTo,
    Shutdown,
}

/// Spoken vocabulary (German).  Several phrases may map to one tag; order
/// decides ties.
pub const VOCABULARY: &[(&str, CommandTag)] = &[
    ("stopp", CommandTag::Pause),
    ("pause", CommandTag::Pause),
    ("weiter", CommandTag::Resume),
    ("abspielen", CommandTag::Resume),
    ("schneller", CommandTag::Faster),
    ("langsamer", CommandTag::Slower),
    ("nächstes bild", CommandTag::Next),
    ("vorheriges bild", CommandTag::Previous),
    ("speichern als favorit", CommandTag::SaveFavorite),
    ("spiele favoriten ab", CommandTag::PlayFavorites),
    ("alle bilder anzeigen", CommandTag::PlayAll),
    ("bild löschen", CommandTag::DeleteCurrent),
    ("von vorne", CommandTag::Restart),
    ("gehe zu bild", CommandTag::GoTo),
    ("ausschalten", CommandTag::Shutdown),
];
