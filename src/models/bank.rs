//! 内存题库
//!
//! 充当持久化层：按 ID 保存题目记录，按选择顺序取题

use crate::models::question::QuestionRecord;
use crate::selection::SelectionOrder;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    records: BTreeMap<i64, QuestionRecord>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一道题目，ID 重复时后加入的覆盖先加入的，返回被覆盖的记录
    pub fn insert(&mut self, record: QuestionRecord) -> Option<QuestionRecord> {
        self.records.insert(record.id, record)
    }

    pub fn by_id(&self, id: i64) -> Option<&QuestionRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 取出选中的题目，等价于 `WHERE id IN (...) ORDER BY <selection>`
    ///
    /// 题库中不存在的 ID 直接忽略
    pub fn select(&self, selection: &SelectionOrder) -> Vec<QuestionRecord> {
        let mut selected: Vec<QuestionRecord> = self
            .records
            .values()
            .filter(|record| selection.contains(record.id))
            .cloned()
            .collect();
        selection.sort_by_rank(&mut selected, |record| record.id);
        selected
    }

    /// 选择中在题库里找不到的 ID
    pub fn missing(&self, selection: &SelectionOrder) -> Vec<i64> {
        selection
            .ids()
            .iter()
            .copied()
            .filter(|id| !self.records.contains_key(id))
            .collect()
    }
}

impl FromIterator<QuestionRecord> for QuestionBank {
    fn from_iter<I: IntoIterator<Item = QuestionRecord>>(iter: I) -> Self {
        let mut bank = QuestionBank::new();
        for record in iter {
            bank.insert(record);
        }
        bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::DocNode;
    use crate::selection::order_selection;

    fn record(id: i64) -> QuestionRecord {
        QuestionRecord::new(
            id,
            DocNode::document(vec![DocNode::paragraph(vec![DocNode::text(format!("题{}", id))])]),
            DocNode::document(vec![]),
        )
    }

    #[test]
    fn test_select_follows_selection_order() {
        let bank: QuestionBank = [1, 2, 5, 8, 9].into_iter().map(record).collect();
        let selected = bank.select(&order_selection([5, 2, 8]));
        let ids: Vec<i64> = selected.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 2, 8]);
    }

    #[test]
    fn test_select_skips_missing_ids() {
        let bank: QuestionBank = [1, 2].into_iter().map(record).collect();
        let selection = order_selection([3, 2, 1]);
        let ids: Vec<i64> = bank.select(&selection).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(bank.missing(&selection), vec![3]);
    }
}
