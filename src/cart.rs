//! Shopping cart reconciliation.
//!
//! The backend stores a cart as one row per user holding two parallel arrays,
//! `product_id` and `quantity`. Index `i` of both arrays is one cart line.
//! `Cart` keeps the arrays equal-length, product ids unique and every
//! quantity at least 1.

use serde::{Deserialize, Serialize};

pub type ProductId = i64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("cart has {ids} product ids but {quantities} quantities")]
    LengthMismatch { ids: usize, quantities: usize },

    #[error("product {0} appears more than once in the cart")]
    DuplicateProduct(ProductId),

    #[error("product {0} has a zero quantity")]
    ZeroQuantity(ProductId),

    #[error("cart line {index} does not exist (cart has {len} lines)")]
    NoSuchLine { index: usize, len: usize },
}

/// A product as listed by the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Row shape as stored by the backend; either array may be absent.
#[derive(Debug, Deserialize)]
struct CartRow {
    #[serde(default)]
    product_id: Option<Vec<ProductId>>,
    #[serde(default)]
    quantity: Option<Vec<u32>>,
}

impl TryFrom<CartRow> for Cart {
    type Error = CartError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Cart::from_parts(
            row.product_id.unwrap_or_default(),
            row.quantity.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartRow")]
pub struct Cart {
    #[serde(rename = "product_id")]
    product_ids: Vec<ProductId>,
    #[serde(rename = "quantity")]
    quantities: Vec<u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from the backend's parallel arrays, validating them.
    pub fn from_parts(product_ids: Vec<ProductId>, quantities: Vec<u32>) -> Result<Self, CartError> {
        if product_ids.len() != quantities.len() {
            return Err(CartError::LengthMismatch {
                ids: product_ids.len(),
                quantities: quantities.len(),
            });
        }

        for (i, (&id, &quantity)) in product_ids.iter().zip(&quantities).enumerate() {
            if quantity == 0 {
                return Err(CartError::ZeroQuantity(id));
            }
            if product_ids[..i].contains(&id) {
                return Err(CartError::DuplicateProduct(id));
            }
        }

        Ok(Self {
            product_ids,
            quantities,
        })
    }

    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    pub fn quantities(&self) -> &[u32] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.product_ids
            .iter()
            .zip(&self.quantities)
            .map(|(&product_id, &quantity)| CartLine {
                product_id,
                quantity,
            })
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.position(product_id).map(|i| self.quantities[i])
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.product_ids.iter().position(|&id| id == product_id)
    }

    /// Add one unit of `product_id`: bump its quantity if already in the
    /// cart, otherwise append a new line with quantity 1. Returns the new
    /// quantity.
    pub fn add_product(&mut self, product_id: ProductId) -> u32 {
        match self.position(product_id) {
            Some(i) => {
                self.quantities[i] = self.quantities[i].saturating_add(1);
                self.quantities[i]
            }
            None => {
                self.product_ids.push(product_id);
                self.quantities.push(1);
                1
            }
        }
    }

    /// Adjust the quantity of line `index` by `delta`. A line that would drop
    /// to zero or below is removed. Returns the new quantity, or `None` if the
    /// line was removed.
    pub fn change_quantity(&mut self, index: usize, delta: i64) -> Result<Option<u32>, CartError> {
        let current = *self.quantities.get(index).ok_or(CartError::NoSuchLine {
            index,
            len: self.len(),
        })?;

        let updated = i64::from(current).saturating_add(delta);
        if updated <= 0 {
            self.product_ids.remove(index);
            self.quantities.remove(index);
            return Ok(None);
        }

        let updated = u32::try_from(updated).unwrap_or(u32::MAX);
        self.quantities[index] = updated;
        Ok(Some(updated))
    }

    /// Pair every cart line with its catalogue entry, in cart order. Lines
    /// whose product is missing from `products` get `None`.
    pub fn align<'a>(&self, products: &'a [Product]) -> Vec<(CartLine, Option<&'a Product>)> {
        self.lines()
            .map(|line| {
                let product = products.iter().find(|p| p.id == line.product_id);
                (line, product)
            })
            .collect()
    }

    /// Price times quantity for line `index`; 0 for an unknown product.
    pub fn line_total(&self, index: usize, products: &[Product]) -> Result<f64, CartError> {
        let line = self.lines().nth(index).ok_or(CartError::NoSuchLine {
            index,
            len: self.len(),
        })?;

        Ok(products
            .iter()
            .find(|p| p.id == line.product_id)
            .map(|p| p.price * f64::from(line.quantity))
            .unwrap_or(0.0))
    }

    /// Sum of price times quantity over every line. Missing products count
    /// as 0.
    pub fn total(&self, products: &[Product]) -> f64 {
        self.align(products)
            .into_iter()
            .map(|(line, product)| {
                product
                    .map(|p| p.price * f64::from(line.quantity))
                    .unwrap_or(0.0)
            })
            .sum()
    }
}
