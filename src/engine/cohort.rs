// ==========================================
// 招生录取分配系统 - 通道拆分
// ==========================================
// 职责: 按学术通道将合格考生拆成 DIRECT / FREE 两组
// 红线: 只分组不排序,两组均保持输入顺序
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::types::AcademicTrack;

/// 拆分结果（下标指向考生列表）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cohorts {
    pub direct: Vec<usize>,
    pub free: Vec<usize>,
}

pub struct CohortSplitter;

impl CohortSplitter {
    /// 拆分给定下标集合
    pub fn split(candidates: &[Candidate], indices: &[usize]) -> Cohorts {
        let (direct, free) = indices
            .iter()
            .copied()
            .partition(|&idx| candidates[idx].track == AcademicTrack::Direct);

        Cohorts { direct, free }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_preserves_input_order() {
        let candidates = vec![
            Candidate::new("A", "1", 7.0, 7.0, "X", AcademicTrack::Free),
            Candidate::new("B", "2", 7.0, 7.0, "X", AcademicTrack::Direct),
            Candidate::new("C", "3", 7.0, 7.0, "X", AcademicTrack::Free),
            Candidate::new("D", "4", 7.0, 7.0, "X", AcademicTrack::Direct),
        ];

        let cohorts = CohortSplitter::split(&candidates, &[0, 1, 2, 3]);
        assert_eq!(cohorts.direct, vec![1, 3]);
        assert_eq!(cohorts.free, vec![0, 2]);
    }

    #[test]
    fn test_split_only_considers_given_indices() {
        let candidates = vec![
            Candidate::new("A", "1", 7.0, 7.0, "X", AcademicTrack::Direct),
            Candidate::new("B", "2", 7.0, 7.0, "X", AcademicTrack::Direct),
        ];
        let cohorts = CohortSplitter::split(&candidates, &[1]);
        assert_eq!(cohorts.direct, vec![1]);
        assert!(cohorts.free.is_empty());
    }
}
