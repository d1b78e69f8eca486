// ==========================================
// 招生录取分配系统 - 同专业排序规则
// ==========================================
// 排序键（最优在前）:
// 1) total_score 降序
// 2) aptitude_score 降序
// 3) knowledge_score 降序
// 4) birth_date 降序（更年轻优先,双方都有日期时才比较）
// 5) registered_at 升序（更早报名优先,双方都有时间时才比较）
// 其余视为相等,稳定排序保留输入顺序
// ==========================================

use crate::domain::candidate::Candidate;
use std::cmp::Ordering;

pub struct TieBreakComparator;

impl TieBreakComparator {
    /// Ordering::Less 表示 a 优先于 b
    pub fn compare(a: &Candidate, b: &Candidate) -> Ordering {
        b.total_score()
            .total_cmp(&a.total_score())
            .then_with(|| b.aptitude_score.total_cmp(&a.aptitude_score))
            .then_with(|| b.knowledge_score.total_cmp(&a.knowledge_score))
            .then_with(|| both_present(a.birth_date, b.birth_date, |x, y| y.cmp(&x)))
            .then_with(|| both_present(a.registered_at, b.registered_at, |x, y| x.cmp(&y)))
    }

    /// 按排序规则稳定排序下标
    pub fn sort_indices(candidates: &[Candidate], indices: &mut [usize]) {
        indices.sort_by(|&a, &b| Self::compare(&candidates[a], &candidates[b]));
    }

    /// 稳定排序考生
    pub fn sort(candidates: &mut [Candidate]) {
        candidates.sort_by(Self::compare);
    }
}

/// 仅当双方都有值时比较,否则跳过该键
fn both_present<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AcademicTrack;
    use chrono::NaiveDate;

    fn candidate(code: &str, ac: f64, co: f64) -> Candidate {
        Candidate::new(code, "12345678", ac, co, "V", AcademicTrack::Direct)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn codes(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_higher_total_first() {
        let mut list = vec![candidate("LOW", 5.0, 7.0), candidate("HIGH", 8.0, 7.0)];
        TieBreakComparator::sort(&mut list);
        assert_eq!(codes(&list), vec!["HIGH", "LOW"]);
    }

    #[test]
    fn test_aptitude_breaks_total_tie() {
        let g = candidate("G", 8.0, 6.0);
        let h = candidate("H", 9.0, 5.0);
        assert_eq!(TieBreakComparator::compare(&h, &g), Ordering::Less);
    }

    #[test]
    fn test_knowledge_breaks_aptitude_tie() {
        // total 与 aptitude 相同时 knowledge 必然相同,曲线分可制造差异
        let mut a = candidate("A", 8.0, 5.0);
        a.admit_with_curve("V", 1.0);
        let b = candidate("B", 8.0, 6.0);
        assert_eq!(a.total_score(), b.total_score());
        assert_eq!(TieBreakComparator::compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_younger_wins_when_both_dates_present() {
        let older = candidate("OLD", 7.0, 7.0).with_birth_date(date(2004, 3, 1));
        let younger = candidate("YOUNG", 7.0, 7.0).with_birth_date(date(2006, 8, 9));
        let mut list = vec![older, younger];
        TieBreakComparator::sort(&mut list);
        assert_eq!(codes(&list), vec!["YOUNG", "OLD"]);
    }

    #[test]
    fn test_missing_birth_date_skips_to_registration() {
        let a = candidate("A", 7.0, 7.0)
            .with_birth_date(date(2006, 1, 1))
            .with_registered_at(date(2025, 1, 20).and_hms_opt(9, 0, 0).unwrap());
        let b = candidate("B", 7.0, 7.0)
            .with_registered_at(date(2025, 1, 16).and_hms_opt(9, 0, 0).unwrap());

        // 生日缺失 → 比较报名时间,B 更早
        assert_eq!(TieBreakComparator::compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let mut list = vec![
            candidate("Z9", 7.0, 7.0),
            candidate("A1", 7.0, 7.0),
            candidate("M5", 7.0, 7.0),
        ];
        TieBreakComparator::sort(&mut list);
        // 不按编号排序
        assert_eq!(codes(&list), vec!["Z9", "A1", "M5"]);
    }

    #[test]
    fn test_sort_indices() {
        let list = vec![candidate("A", 5.0, 6.0), candidate("B", 9.0, 6.0), candidate("C", 7.0, 6.0)];
        let mut idx = vec![0, 1, 2];
        TieBreakComparator::sort_indices(&list, &mut idx);
        assert_eq!(idx, vec![1, 2, 0]);
    }
}
