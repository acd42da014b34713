//! Steel composition in weight percent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Alloying elements recognized by the empirical correlations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    C,
    Mn,
    Si,
    Cr,
    Ni,
    Mo,
    V,
    W,
    Cu,
    P,
    B,
}

/// Element -> weight-percent map. Missing elements read as 0.0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    wt_pct: BTreeMap<Element, f64>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter; negative inputs are clamped to zero.
    pub fn with(mut self, element: Element, wt_pct: f64) -> Self {
        self.wt_pct.insert(element, wt_pct.max(0.0));
        self
    }

    pub fn get(&self, element: Element) -> f64 {
        self.wt_pct.get(&element).copied().unwrap_or(0.0)
    }

    pub fn c(&self) -> f64 {
        self.get(Element::C)
    }

    pub fn mn(&self) -> f64 {
        self.get(Element::Mn)
    }

    pub fn si(&self) -> f64 {
        self.get(Element::Si)
    }

    pub fn cr(&self) -> f64 {
        self.get(Element::Cr)
    }

    pub fn ni(&self) -> f64 {
        self.get(Element::Ni)
    }

    pub fn mo(&self) -> f64 {
        self.get(Element::Mo)
    }

    pub fn v(&self) -> f64 {
        self.get(Element::V)
    }

    /// Carbon present at all? Several predictors skip when carbon is unknown.
    pub fn has_carbon(&self) -> bool {
        self.c() > 0.0
    }

    /// Carbon equivalent CE(IIW) = C + Mn/6 + (Cr+Mo+V)/5 + (Ni+Cu)/15.
    pub fn carbon_equivalent_iiw(&self) -> f64 {
        self.c()
            + self.mn() / 6.0
            + (self.cr() + self.mo() + self.v()) / 5.0
            + (self.ni() + self.get(Element::Cu)) / 15.0
    }

    /// Hollomon-Jaffe material constant, C_HJ = 21.3 - 5.8*%C.
    pub fn hollomon_jaffe_c(&self) -> f64 {
        if self.has_carbon() {
            21.3 - 5.8 * self.c()
        } else {
            20.0
        }
    }
}
