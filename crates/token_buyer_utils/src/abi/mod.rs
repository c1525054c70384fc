use ethers::contract::abigen;

abigen!(
    PancakeRouterAbigen,
    r#"[
        function factory() external view returns (address)
        function addLiquidityETH(address token, uint256 amountTokenDesired, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity)
        function swapExactTokensForETHSupportingFeeOnTransferTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external
    ]"#
);

abigen!(
    PancakeFactoryAbigen,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#
);

abigen!(
    PancakePairAbigen,
    r#"[
        event Mint(address indexed sender, uint256 amount0, uint256 amount1)
    ]"#
);

abigen!(
    Erc20Abigen,
    r#"[
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function balanceOf(address owner) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 value) external returns (bool)
    ]"#
);
