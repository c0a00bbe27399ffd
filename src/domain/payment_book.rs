use crate::domain::payment::PaymentRequest;

/// Payment requests in submission order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaymentBook {
    requests: Vec<PaymentRequest>,
}

impl PaymentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, request: PaymentRequest) {
        self.requests.push(request);
    }

    pub fn get(&self, id: &str) -> Option<&PaymentRequest> {
        self.requests.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PaymentRequest> {
        self.requests.iter_mut().find(|p| p.id == id)
    }

    /// Most recent request carrying this external transaction reference.
    pub fn find_by_reference(&self, reference: &str) -> Option<&PaymentRequest> {
        self.requests
            .iter()
            .rev()
            .find(|p| p.transaction_id == reference)
    }

    /// Newest first; requests created at the same instant keep submission order.
    pub fn list_all(&self) -> Vec<PaymentRequest> {
        newest_first(self.requests.iter())
    }

    pub fn list_for_account(&self, user_id: &str) -> Vec<PaymentRequest> {
        newest_first(self.requests.iter().filter(|p| p.user_id == user_id))
    }

    /// Drop every request made by `user_id`; returns how many went.
    pub fn purge_account(&mut self, user_id: &str) -> usize {
        let before = self.requests.len();
        self.requests.retain(|p| p.user_id != user_id);
        before - self.requests.len()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[PaymentRequest] {
        &self.requests
    }
}

impl From<Vec<PaymentRequest>> for PaymentBook {
    fn from(requests: Vec<PaymentRequest>) -> Self {
        Self { requests }
    }
}

fn newest_first<'a>(requests: impl Iterator<Item = &'a PaymentRequest>) -> Vec<PaymentRequest> {
    let mut out: Vec<PaymentRequest> = requests.cloned().collect();
    // stable sort keeps insertion order on equal timestamps
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}
