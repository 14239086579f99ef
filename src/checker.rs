//! Answer checking and the marks shown on buttons afterwards.

use std::time::{Duration, Instant};

use hashbrown::HashMap;

use crate::exercises::Button;

/// Strict equality for counts, order sensitive element-wise equality for tone sequences.
pub fn check<T: PartialEq + ?Sized>(selected: &T, correct: &T) -> bool {
    selected == correct
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn of(correct: bool) -> Self {
        match correct {
            true => Verdict::Correct,
            false => Verdict::Incorrect,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
        }
    }
}

/// Marks currently shown on buttons.
/// Each one clears itself once its time is up.
#[derive(Default)]
pub struct Marks {
    marks: HashMap<Button, (Verdict, Instant)>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all marks with a single one on `button`.
    pub fn set(&mut self, button: Button, verdict: Verdict, now: Instant, clear_after: Duration) {
        self.marks.clear();
        self.marks.insert(button, (verdict, now + clear_after));
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn get(&self, button: Button, now: Instant) -> Option<Verdict> {
        self.marks
            .get(&button)
            .filter(|(_, expires)| now < *expires)
            .map(|(verdict, _)| *verdict)
    }

    /// Drop expired marks. Returns true if anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.marks.len();
        self.marks.retain(|_, (_, expires)| now < *expires);
        before != self.marks.len()
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use super::{check, Marks, Verdict};
    use crate::exercises::Button;

    #[test]
    fn test_check_is_reflexive() {
        let tones = vec![3100, 4720, 5000, 7999, 3000];
        assert!(check(&tones, &tones.clone()));
        assert!(check(&4, &4));
    }

    #[test]
    fn test_check_is_order_sensitive() {
        assert!(!check(&vec![400, 800], &vec![800, 400]));
        assert!(!check(&vec![400], &vec![400, 400]));
        assert!(!check(&3, &4));
    }

    #[test]
    fn test_marks_expire() {
        let now = Instant::now();
        let mut marks = Marks::new();
        marks.set(Button::Sound(2), Verdict::Correct, now, Duration::from_millis(500));

        assert_eq!(marks.get(Button::Sound(2), now), Some(Verdict::Correct));
        assert_eq!(marks.get(Button::Sound(1), now), None);
        assert!(!marks.prune(now + Duration::from_millis(499)));

        let later = now + Duration::from_millis(500);
        assert_eq!(marks.get(Button::Sound(2), later), None);
        assert!(marks.prune(later));
    }

    #[test]
    fn test_new_mark_replaces_old() {
        let now = Instant::now();
        let mut marks = Marks::new();
        marks.set(Button::Sound(1), Verdict::Incorrect, now, Duration::from_secs(1));
        marks.set(Button::Sound(3), Verdict::Correct, now, Duration::from_secs(1));

        assert_eq!(marks.get(Button::Sound(1), now), None);
        assert_eq!(marks.get(Button::Sound(3), now), Some(Verdict::Correct));
    }
}
